use serde::{Deserialize, Serialize};

use crate::utils::normalize::{extract_choice_letter, is_bare_letter};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub category: TechCategory,
    pub question: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(flatten)]
    pub details: QuestionDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    ShortAnswer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionDetails {
    MultipleChoice(MultipleChoiceDetails),
    ShortAnswer(ShortAnswerDetails),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleChoiceDetails {
    /// May be absent in catalog documents; grading only needs the answer.
    #[serde(default)]
    pub options: Vec<String>,
    /// Either a bare letter ("B") or a lettered option ("B. Heap").
    pub correct_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortAnswerDetails {
    /// Acceptable synonyms, compared after normalization.
    pub correct_answers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechCategory {
    Java,
    Database,
    OperatingSystem,
    Cloud,
    Security,
    Network,
}

impl TechCategory {
    pub const ALL: [TechCategory; 6] = [
        TechCategory::Java,
        TechCategory::Database,
        TechCategory::OperatingSystem,
        TechCategory::Cloud,
        TechCategory::Security,
        TechCategory::Network,
    ];

    /// Wire name, also used as the aggregation key.
    pub fn as_str(&self) -> &'static str {
        match self {
            TechCategory::Java => "java",
            TechCategory::Database => "database",
            TechCategory::OperatingSystem => "operating_system",
            TechCategory::Cloud => "cloud",
            TechCategory::Security => "security",
            TechCategory::Network => "network",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TechCategory::Java => "Java",
            TechCategory::Database => "Database",
            TechCategory::OperatingSystem => "Operating System",
            TechCategory::Cloud => "Cloud",
            TechCategory::Security => "Security",
            TechCategory::Network => "Network",
        }
    }

    pub fn from_key(key: &str) -> Option<TechCategory> {
        TechCategory::ALL.into_iter().find(|c| c.as_str() == key)
    }
}

impl Question {
    /// The catalog's correct answer as display text: the stored choice for
    /// multiple choice, the first synonym for short answer.
    pub fn correct_answer_text(&self) -> String {
        match &self.details {
            QuestionDetails::MultipleChoice(mc) => mc.correct_answer.clone(),
            QuestionDetails::ShortAnswer(sa) => sa.correct_answers.first().cloned().unwrap_or_default(),
        }
    }

    pub fn options(&self) -> Option<&[String]> {
        match &self.details {
            QuestionDetails::MultipleChoice(mc) => Some(&mc.options),
            QuestionDetails::ShortAnswer(_) => None,
        }
    }

    /// Logs catalog entries whose stored shape grading cannot rely on.
    /// Never alters grading.
    pub fn audit(&self) {
        match (&self.question_type, &self.details) {
            (QuestionType::MultipleChoice, QuestionDetails::MultipleChoice(mc)) => {
                let answer = mc.correct_answer.trim();
                if !is_bare_letter(answer) && extract_choice_letter(answer).is_none() {
                    tracing::warn!(
                        question_id = %self.id,
                        "multiple choice answer {:?} is neither a bare letter nor a lettered option",
                        answer
                    );
                }
            }
            (QuestionType::ShortAnswer, QuestionDetails::ShortAnswer(sa)) => {
                if sa.correct_answers.is_empty() {
                    tracing::warn!(question_id = %self.id, "short answer question has no acceptable answers");
                }
            }
            _ => {
                tracing::warn!(question_id = %self.id, "question type does not match stored details");
            }
        }
    }
}

/// Question as served to an applicant: no answers, no explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub category: TechCategory,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            question_type: q.question_type,
            category: q.category,
            question: q.question.clone(),
            options: q.options().map(|o| o.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_both_question_shapes() {
        let mc: Question = serde_json::from_value(serde_json::json!({
            "id": "q1",
            "type": "multiple_choice",
            "category": "java",
            "question": "Which keyword prevents inheritance?",
            "options": ["A. final", "B. static"],
            "correctAnswer": "A"
        }))
        .unwrap();
        assert!(matches!(mc.details, QuestionDetails::MultipleChoice(_)));
        assert_eq!(mc.correct_answer_text(), "A");

        let sa: Question = serde_json::from_value(serde_json::json!({
            "id": "q2",
            "type": "short_answer",
            "category": "operating_system",
            "question": "Name the scheduling structure",
            "correctAnswers": ["ready queue", "run queue"]
        }))
        .unwrap();
        assert!(matches!(sa.details, QuestionDetails::ShortAnswer(_)));
        assert_eq!(sa.category, TechCategory::OperatingSystem);
        assert!(sa.options().is_none());
    }

    #[test]
    fn multiple_choice_without_options_is_graded() {
        use crate::models::technical_result::TechnicalSubmission;
        use crate::services::grading_service::GradingService;

        let q: Question = serde_json::from_value(serde_json::json!({
            "id": "q9",
            "type": "multiple_choice",
            "category": "java",
            "question": "Pick one",
            "correctAnswer": "A"
        }))
        .unwrap();
        assert!(matches!(q.details, QuestionDetails::MultipleChoice(_)));
        assert_eq!(q.options(), Some(&[][..]));

        let submission = TechnicalSubmission {
            answers: [("q9".to_string(), "A. first".to_string())].into_iter().collect(),
            ..Default::default()
        };
        let outcome = GradingService::grade(&submission, &[q]);
        assert_eq!(outcome.max_score, 1);
        assert_eq!(outcome.score, 1);
    }

    #[test]
    fn category_keys_round_trip() {
        for category in TechCategory::ALL {
            assert_eq!(TechCategory::from_key(category.as_str()), Some(category));
        }
        assert_eq!(TechCategory::from_key("other"), None);
    }
}
