use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::personality::{PersonalityAnswerDetail, PersonalityCategory, PersonalityScoreSummary};
use super::technical_result::{CategoryStat, QuestionDetail};

/// Everything known about one applicant's tests. This is the input of the
/// interview-question rules and of the AI narrative prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical: Option<TechnicalSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<PersonalitySnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSnapshot {
    pub score: i32,
    pub max_score: i32,
    pub total_time: i32,
    pub category_scores: BTreeMap<String, CategoryStat>,
    pub question_details: Vec<QuestionDetail>,
}

impl TechnicalSnapshot {
    pub fn percentage(&self) -> f64 {
        if self.max_score > 0 {
            self.score as f64 / self.max_score as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn in_category<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a QuestionDetail> + 'a {
        self.question_details.iter().filter(move |d| d.category == key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalitySnapshot {
    pub scores: PersonalityScoreSummary,
    pub question_details: Vec<PersonalityAnswerDetail>,
}

impl PersonalitySnapshot {
    pub fn in_category(
        &self,
        category: PersonalityCategory,
    ) -> impl Iterator<Item = &PersonalityAnswerDetail> + '_ {
        self.question_details.iter().filter(move |d| d.category == category)
    }
}
