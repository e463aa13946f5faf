use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::question::QuestionType;

/// Raw technical submission, already shape-validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSubmission {
    pub answers: HashMap<String, String>,
    #[serde(default)]
    pub question_times: HashMap<String, i32>,
    pub total_time: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GradedResult {
    pub question_id: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub time_spent: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalTestRecord {
    pub results: Vec<GradedResult>,
    pub score: i32,
    pub max_score: i32,
    pub total_time: i32,
    pub submitted_at: DateTime<Utc>,
}

impl TechnicalTestRecord {
    pub fn percentage(&self) -> f64 {
        if self.max_score > 0 {
            self.score as f64 / self.max_score as f64 * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub correct: i32,
    pub total: i32,
    pub percentage: f64,
    pub average_time: f64,
}

/// A graded result joined with its catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    pub question_id: String,
    /// Category key; `"other"` when the catalog has no entry.
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_type: Option<QuestionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub time_spent: i32,
}
