use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    High,
    Medium,
    Low,
}

impl Recommendation {
    /// Accepts the English enumeration in any case and the Korean grade
    /// words the model sometimes answers with.
    pub fn parse(raw: &str) -> Option<Recommendation> {
        match raw.trim().to_lowercase().as_str() {
            "high" | "상" | "높음" => Some(Recommendation::High),
            "medium" | "중" | "보통" => Some(Recommendation::Medium),
            "low" | "하" | "낮음" => Some(Recommendation::Low),
            _ => None,
        }
    }
}

/// Narrative part of the report. Every field is a flat string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiNarrative {
    pub technical_analysis: String,
    pub personality_analysis: String,
    pub strengths: String,
    pub weaknesses: String,
    pub overall_assessment: String,
    pub interview_focus: String,
    pub recommendation: Recommendation,
    pub recommendation_reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    pub category: String,
    pub question: String,
    pub purpose: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub based_on: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_questions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InterviewQuestions {
    pub technical: Vec<GeneratedQuestion>,
    pub personality: Vec<GeneratedQuestion>,
    pub follow_up: Vec<GeneratedQuestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiStatus {
    /// Strict parse of the model output succeeded.
    Generated,
    /// Output needed one of the recovery stages.
    Recovered,
    /// Service failed or output was unusable; placeholder narrative.
    Fallback,
}

impl AiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiStatus::Generated => "generated",
            AiStatus::Recovered => "recovered",
            AiStatus::Fallback => "fallback",
        }
    }
}

/// Persisted report document consumed by the admin UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentReport {
    #[serde(flatten)]
    pub narrative: AiNarrative,
    pub interview_questions: InterviewQuestions,
    pub ai_status: AiStatus,
    pub generated_at: DateTime<Utc>,
}
