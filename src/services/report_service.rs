use crate::error::{Error, Result};
use crate::models::applicant_results::ApplicantResults;
use crate::models::report::AssessmentReport;
use crate::services::ai_service::NarrativeGenerator;
use crate::services::catalog_service::QuestionCatalog;
use crate::services::enrichment_service::EnrichmentService;
use crate::services::question_generator::QuestionGenerator;
use crate::services::report_parser;
use crate::services::store_service::AssessmentStore;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

#[derive(Clone)]
pub struct ReportService {
    catalog: Arc<dyn QuestionCatalog>,
    store: Arc<dyn AssessmentStore>,
    generator: Arc<dyn NarrativeGenerator>,
}

impl ReportService {
    pub fn new(
        catalog: Arc<dyn QuestionCatalog>,
        store: Arc<dyn AssessmentStore>,
        generator: Arc<dyn NarrativeGenerator>,
    ) -> Self {
        Self {
            catalog,
            store,
            generator,
        }
    }

    /// Combines the model output (if any) with template-generated interview
    /// questions. `None` output means the model call failed.
    pub fn build_report<R: Rng + ?Sized>(
        results: &ApplicantResults,
        generator_output: Option<&str>,
        rng: &mut R,
    ) -> AssessmentReport {
        let (narrative, ai_status) = match generator_output {
            Some(raw) => report_parser::interpret(raw),
            None => (
                report_parser::placeholder_report(),
                crate::models::report::AiStatus::Fallback,
            ),
        };

        AssessmentReport {
            narrative,
            interview_questions: QuestionGenerator::generate_with_content(results, rng),
            ai_status,
            generated_at: Utc::now(),
        }
    }

    /// Stored records joined with catalog metadata.
    pub async fn load_results(&self, applicant_id: Uuid) -> Result<ApplicantResults> {
        Ok(self.load_records(applicant_id).await?.0)
    }

    /// Assembled results plus the newest `submitted_at` among the records
    /// they were built from.
    async fn load_records(
        &self,
        applicant_id: Uuid,
    ) -> Result<(ApplicantResults, Option<DateTime<Utc>>)> {
        self.store.get_applicant(applicant_id).await?;

        let technical = self.store.get_technical(applicant_id).await?;
        let personality = self.store.get_personality(applicant_id).await?;

        let bank = match technical.as_ref() {
            Some(record) => {
                let ids: Vec<String> = record.results.iter().map(|r| r.question_id.clone()).collect();
                self.catalog.find_by_ids(&ids).await?
            }
            None => Vec::new(),
        };

        let source_at = technical
            .as_ref()
            .map(|r| r.submitted_at)
            .max(personality.as_ref().map(|r| r.submitted_at));

        let results = EnrichmentService::assemble(technical.as_ref(), personality.as_ref(), &bank);
        Ok((results, source_at))
    }

    /// Generates and stores the report. A failed model call still produces a
    /// stored placeholder report. A report built from older records than the
    /// stored one is discarded and the stored report is returned instead.
    pub async fn generate_for(&self, applicant_id: Uuid) -> Result<AssessmentReport> {
        let (results, source_at) = self.load_records(applicant_id).await?;
        let Some(source_at) = source_at else {
            return Err(Error::NotFound(format!(
                "No test results for applicant {}",
                applicant_id
            )));
        };

        let output = match self.generator.generate(&results).await {
            Ok(raw) => Some(raw),
            Err(e) => {
                tracing::warn!(%applicant_id, error = %e, "narrative generation failed, using placeholder");
                None
            }
        };

        let report = {
            let mut rng = rand::thread_rng();
            Self::build_report(&results, output.as_deref(), &mut rng)
        };

        if !self.store.save_report(applicant_id, &report, source_at).await? {
            tracing::info!(%applicant_id, "newer report already stored, discarding this one");
            return self.get_report(applicant_id).await;
        }
        tracing::info!(
            %applicant_id,
            ai_status = report.ai_status.as_str(),
            technical_questions = report.interview_questions.technical.len(),
            "assessment report stored"
        );
        Ok(report)
    }

    pub async fn get_report(&self, applicant_id: Uuid) -> Result<AssessmentReport> {
        self.store
            .get_report(applicant_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("No report for applicant {}", applicant_id)))
    }

    /// Detached generation after a submission. Not retried.
    pub fn spawn_generation(&self, applicant_id: Uuid) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.generate_for(applicant_id).await {
                tracing::error!(%applicant_id, error = ?e, "background report generation failed");
            }
        })
    }
}
