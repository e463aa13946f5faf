use crate::models::applicant::Applicant;
use crate::models::applicant_results::ApplicantResults;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantResultsResponse {
    pub applicant: Applicant,
    pub results: ApplicantResults,
}
