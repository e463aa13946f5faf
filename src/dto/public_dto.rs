use crate::models::applicant::NewApplicant;
use crate::models::personality::{PersonalityItem, PersonalityScoreSummary};
use crate::models::question::PublicQuestion;
use crate::models::technical_result::TechnicalSubmission;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateApplicantRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
}

impl From<CreateApplicantRequest> for NewApplicant {
    fn from(req: CreateApplicantRequest) -> Self {
        Self {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            phone: req.phone.filter(|p| !p.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApplicantResponse {
    pub id: uuid::Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalTestResponse {
    pub total_questions: usize,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTechnicalRequest {
    #[validate(required)]
    pub answers: Option<HashMap<String, String>>,
    pub question_times: Option<HashMap<String, i32>>,
    #[validate(required, range(min = 0))]
    pub total_time: Option<i32>,
    /// Ids of the served test instance, in order.
    pub question_ids: Option<Vec<String>>,
}

impl SubmitTechnicalRequest {
    /// Call after `validate()`; missing required fields are already rejected.
    pub fn into_parts(self) -> (TechnicalSubmission, Option<Vec<String>>) {
        (
            TechnicalSubmission {
                answers: self.answers.unwrap_or_default(),
                question_times: self.question_times.unwrap_or_default(),
                total_time: self.total_time.unwrap_or_default(),
            },
            self.question_ids,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTechnicalResponse {
    pub score: i32,
    pub max_score: i32,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityTestResponse {
    pub total_questions: usize,
    pub items: Vec<PersonalityItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitPersonalityRequest {
    #[validate(required, length(min = 1))]
    pub answers: Option<HashMap<String, i32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPersonalityResponse {
    pub scores: PersonalityScoreSummary,
    pub answered: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_answers_fail_validation() {
        let req: SubmitTechnicalRequest =
            serde_json::from_value(serde_json::json!({ "totalTime": 10 })).unwrap();
        assert!(req.validate().is_err());

        let req: SubmitTechnicalRequest = serde_json::from_value(serde_json::json!({
            "answers": { "q1": "A" },
            "totalTime": -3
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_valid_technical_request_converts() {
        let req: SubmitTechnicalRequest = serde_json::from_value(serde_json::json!({
            "answers": { "q1": "A" },
            "totalTime": 42,
            "questionIds": ["q1", "q2"]
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        let (submission, ids) = req.into_parts();
        assert_eq!(submission.total_time, 42);
        assert!(submission.question_times.is_empty());
        assert_eq!(ids.unwrap().len(), 2);
    }

    #[test]
    fn test_applicant_email_is_checked() {
        let req = CreateApplicantRequest {
            name: "Choi".into(),
            email: "not-an-email".into(),
            phone: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_empty_personality_answers_rejected() {
        let req = SubmitPersonalityRequest {
            answers: Some(HashMap::new()),
        };
        assert!(req.validate().is_err());
    }
}
