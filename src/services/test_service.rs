use crate::error::{Error, Result};
use crate::models::applicant::{Applicant, NewApplicant};
use crate::models::personality::{PersonalityItem, PersonalityTestRecord};
use crate::models::question::PublicQuestion;
use crate::models::technical_result::{TechnicalSubmission, TechnicalTestRecord};
use crate::services::catalog_service::QuestionCatalog;
use crate::services::grading_service::GradingService;
use crate::services::personality_service::PersonalityService;
use crate::services::report_service::ReportService;
use crate::services::store_service::AssessmentStore;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct TestService {
    catalog: Arc<dyn QuestionCatalog>,
    store: Arc<dyn AssessmentStore>,
    reports: ReportService,
    question_count: usize,
}

impl TestService {
    pub fn new(
        catalog: Arc<dyn QuestionCatalog>,
        store: Arc<dyn AssessmentStore>,
        reports: ReportService,
        question_count: usize,
    ) -> Self {
        Self {
            catalog,
            store,
            reports,
            question_count,
        }
    }

    pub async fn register_applicant(&self, applicant: NewApplicant) -> Result<Applicant> {
        self.store.create_applicant(&applicant).await
    }

    /// A fresh technical test instance without answers or explanations.
    pub async fn draw_technical_instance(&self) -> Result<Vec<PublicQuestion>> {
        let questions = self.catalog.sample(self.question_count).await?;
        if questions.len() < self.question_count {
            tracing::warn!(
                requested = self.question_count,
                drawn = questions.len(),
                "catalog has fewer technical questions than a full test"
            );
        }
        Ok(questions.iter().map(PublicQuestion::from).collect())
    }

    pub async fn personality_items(&self) -> Result<Vec<PersonalityItem>> {
        let bank = self.catalog.personality_bank().await?;
        Ok(bank.iter().map(PersonalityItem::from).collect())
    }

    pub fn validate_submission(submission: &TechnicalSubmission) -> Result<()> {
        if submission.total_time < 0 {
            return Err(Error::BadRequest("totalTime must not be negative".to_string()));
        }
        if let Some((id, _)) = submission.question_times.iter().find(|(_, t)| **t < 0) {
            return Err(Error::BadRequest(format!(
                "Time spent on question {} must not be negative",
                id
            )));
        }
        if submission.answers.keys().any(|id| id.trim().is_empty()) {
            return Err(Error::BadRequest("Question ids must not be empty".to_string()));
        }
        Ok(())
    }

    /// The ids that make up the graded test: the instance the client was
    /// served when it sends one back, otherwise the answered ids.
    pub fn resolve_bank_ids(
        submission: &TechnicalSubmission,
        instance_ids: Option<&[String]>,
    ) -> Vec<String> {
        match instance_ids {
            Some(ids) if !ids.is_empty() => {
                let mut seen = HashSet::new();
                ids.iter()
                    .filter(|id| seen.insert(id.as_str()))
                    .cloned()
                    .collect()
            }
            _ => {
                let mut ids: Vec<String> = submission.answers.keys().cloned().collect();
                ids.sort();
                ids
            }
        }
    }

    pub async fn submit_technical(
        &self,
        applicant_id: Uuid,
        submission: TechnicalSubmission,
        instance_ids: Option<Vec<String>>,
    ) -> Result<TechnicalTestRecord> {
        Self::validate_submission(&submission)?;
        self.store.get_applicant(applicant_id).await?;

        let bank_ids = Self::resolve_bank_ids(&submission, instance_ids.as_deref());
        let bank = self.catalog.find_by_ids(&bank_ids).await?;

        let outcome = GradingService::grade(&submission, &bank);
        let record = GradingService::to_record(outcome, submission.total_time);
        self.store.save_technical(applicant_id, &record).await?;

        tracing::info!(
            %applicant_id,
            score = record.score,
            max_score = record.max_score,
            "technical test graded"
        );
        self.reports.spawn_generation(applicant_id);
        Ok(record)
    }

    pub async fn submit_personality(
        &self,
        applicant_id: Uuid,
        answers: HashMap<String, i32>,
    ) -> Result<PersonalityTestRecord> {
        PersonalityService::validate_answers(&answers)?;
        self.store.get_applicant(applicant_id).await?;

        let ids: Vec<String> = answers.keys().cloned().collect();
        let bank = self.catalog.find_personality_by_ids(&ids).await?;

        let outcome = PersonalityService::score(&answers, &bank);
        let record = PersonalityService::to_record(outcome);
        self.store.save_personality(applicant_id, &record).await?;

        tracing::info!(
            %applicant_id,
            total = record.scores.total,
            answered = record.details.len(),
            "personality test scored"
        );
        self.reports.spawn_generation(applicant_id);
        Ok(record)
    }
}
