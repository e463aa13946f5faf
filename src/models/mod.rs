pub mod applicant;
pub mod applicant_results;
pub mod personality;
pub mod question;
pub mod report;
pub mod technical_result;
