pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    ai_service::{AIService, NarrativeGenerator},
    catalog_service::{PgQuestionCatalog, QuestionCatalog},
    report_service::ReportService,
    store_service::{AssessmentStore, PgAssessmentStore},
    test_service::TestService,
};
use reqwest::Client;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AssessmentStore>,
    pub test_service: TestService,
    pub report_service: ReportService,
}

impl AppState {
    pub fn new(pool: PgPool) -> error::Result<Self> {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.ai_timeout_seconds))
            .build()?;

        let generator = AIService::new(
            config.openai_api_key.clone(),
            config.openai_api_url.clone(),
            config.openai_model.clone(),
            http_client,
        );

        Ok(Self::with_collaborators(
            Arc::new(PgQuestionCatalog::new(pool.clone())),
            Arc::new(PgAssessmentStore::new(pool)),
            Arc::new(generator),
            config.tech_test_question_count,
        ))
    }

    pub fn with_collaborators(
        catalog: Arc<dyn QuestionCatalog>,
        store: Arc<dyn AssessmentStore>,
        generator: Arc<dyn NarrativeGenerator>,
        question_count: usize,
    ) -> Self {
        let report_service = ReportService::new(catalog.clone(), store.clone(), generator);
        let test_service = TestService::new(
            catalog,
            store.clone(),
            report_service.clone(),
            question_count,
        );

        Self {
            store,
            test_service,
            report_service,
        }
    }
}
