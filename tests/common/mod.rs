#![allow(dead_code)]

use assessment_backend::error::{Error, Result};
use assessment_backend::models::applicant::{Applicant, NewApplicant};
use assessment_backend::models::applicant_results::ApplicantResults;
use assessment_backend::models::personality::{
    PersonalityBank, PersonalityCategory, PersonalityQuestion, PersonalityTestRecord,
};
use assessment_backend::models::question::{
    MultipleChoiceDetails, Question, QuestionDetails, QuestionType, ShortAnswerDetails,
    TechCategory,
};
use assessment_backend::models::report::AssessmentReport;
use assessment_backend::models::technical_result::TechnicalTestRecord;
use assessment_backend::services::ai_service::NarrativeGenerator;
use assessment_backend::services::catalog_service::QuestionCatalog;
use assessment_backend::services::store_service::AssessmentStore;
use assessment_backend::AppState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct InMemoryCatalog {
    pub questions: Vec<Question>,
    pub personality: Vec<PersonalityQuestion>,
}

#[async_trait]
impl QuestionCatalog for InMemoryCatalog {
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Question>> {
        Ok(self
            .questions
            .iter()
            .filter(|q| ids.contains(&q.id))
            .cloned()
            .collect())
    }

    async fn sample(&self, count: usize) -> Result<Vec<Question>> {
        Ok(self.questions.iter().take(count).cloned().collect())
    }

    async fn personality_bank(&self) -> Result<PersonalityBank> {
        Ok(PersonalityBank::from_questions(self.personality.clone()))
    }

    async fn find_personality_by_ids(&self, ids: &[String]) -> Result<PersonalityBank> {
        Ok(PersonalityBank::from_questions(
            self.personality
                .iter()
                .filter(|q| ids.contains(&q.id))
                .cloned()
                .collect(),
        ))
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    pub applicants: RwLock<HashMap<Uuid, Applicant>>,
    pub technical: RwLock<HashMap<Uuid, TechnicalTestRecord>>,
    pub personality: RwLock<HashMap<Uuid, PersonalityTestRecord>>,
    pub reports: RwLock<HashMap<Uuid, AssessmentReport>>,
    pub report_sources: RwLock<HashMap<Uuid, DateTime<Utc>>>,
}

#[async_trait]
impl AssessmentStore for InMemoryStore {
    async fn create_applicant(&self, applicant: &NewApplicant) -> Result<Applicant> {
        let row = Applicant {
            id: Uuid::new_v4(),
            name: applicant.name.clone(),
            email: applicant.email.clone(),
            phone: applicant.phone.clone(),
            created_at: Utc::now(),
        };
        self.applicants.write().await.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_applicant(&self, id: Uuid) -> Result<Applicant> {
        self.applicants
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Applicant {} not found", id)))
    }

    async fn save_technical(&self, applicant_id: Uuid, record: &TechnicalTestRecord) -> Result<()> {
        self.technical.write().await.insert(applicant_id, record.clone());
        Ok(())
    }

    async fn get_technical(&self, applicant_id: Uuid) -> Result<Option<TechnicalTestRecord>> {
        Ok(self.technical.read().await.get(&applicant_id).cloned())
    }

    async fn save_personality(
        &self,
        applicant_id: Uuid,
        record: &PersonalityTestRecord,
    ) -> Result<()> {
        self.personality.write().await.insert(applicant_id, record.clone());
        Ok(())
    }

    async fn get_personality(&self, applicant_id: Uuid) -> Result<Option<PersonalityTestRecord>> {
        Ok(self.personality.read().await.get(&applicant_id).cloned())
    }

    async fn save_report(
        &self,
        applicant_id: Uuid,
        report: &AssessmentReport,
        source_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut sources = self.report_sources.write().await;
        if sources.get(&applicant_id).is_some_and(|stored| *stored > source_at) {
            return Ok(false);
        }
        sources.insert(applicant_id, source_at);
        self.reports.write().await.insert(applicant_id, report.clone());
        Ok(true)
    }

    async fn get_report(&self, applicant_id: Uuid) -> Result<Option<AssessmentReport>> {
        Ok(self.reports.read().await.get(&applicant_id).cloned())
    }
}

/// Returns a fixed model output, or fails when `output` is `None`.
pub struct ScriptedGenerator {
    pub output: Option<String>,
    pub calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(output: Option<&str>) -> Self {
        Self {
            output: output.map(str::to_string),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl NarrativeGenerator for ScriptedGenerator {
    async fn generate(&self, _input: &ApplicantResults) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.output
            .clone()
            .ok_or_else(|| Error::Internal("model unavailable".to_string()))
    }
}

/// Answers like the inner generator, but takes `delay` longer when the
/// input has no personality results.
pub struct SlowWithoutPersonality {
    pub inner: ScriptedGenerator,
    pub delay: Duration,
}

#[async_trait]
impl NarrativeGenerator for SlowWithoutPersonality {
    async fn generate(&self, input: &ApplicantResults) -> Result<String> {
        if input.personality.is_none() {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.generate(input).await
    }
}

/// Five questions per category, alternating multiple choice (answer "B")
/// and short answer (answer "answer-<id>").
pub fn technical_catalog() -> Vec<Question> {
    let mut out = Vec::new();
    for category in TechCategory::ALL {
        for i in 0..5 {
            let id = format!("{}-{}", category.as_str(), i);
            let (question_type, details) = if i % 2 == 0 {
                (
                    QuestionType::MultipleChoice,
                    QuestionDetails::MultipleChoice(MultipleChoiceDetails {
                        options: vec![
                            "A. first".into(),
                            "B. second".into(),
                            "C. third".into(),
                        ],
                        correct_answer: "B".into(),
                    }),
                )
            } else {
                (
                    QuestionType::ShortAnswer,
                    QuestionDetails::ShortAnswer(ShortAnswerDetails {
                        correct_answers: vec![format!("answer-{}", id)],
                    }),
                )
            };
            out.push(Question {
                id: id.clone(),
                question_type,
                category,
                question: format!("Question {} about {}", i, category.label()),
                explanation: None,
                details,
            });
        }
    }
    out
}

pub fn correct_answer(q: &Question) -> String {
    match &q.details {
        QuestionDetails::MultipleChoice(_) => "B".to_string(),
        QuestionDetails::ShortAnswer(sa) => sa.correct_answers[0].clone(),
    }
}

/// 40 items spread over the three categories; every second item is
/// reverse-scored.
pub fn personality_catalog() -> Vec<PersonalityQuestion> {
    (0..40)
        .map(|i| PersonalityQuestion {
            id: format!("p-{:02}", i),
            category: PersonalityCategory::ALL[i % 3],
            content: format!("Personality statement {}", i),
            reverse_scoring: i % 2 == 1,
        })
        .collect()
}

pub struct Harness<G = ScriptedGenerator> {
    pub state: AppState,
    pub store: Arc<InMemoryStore>,
    pub generator: Arc<G>,
}

pub fn harness(output: Option<&str>) -> Harness {
    harness_with(ScriptedGenerator::new(output))
}

pub fn harness_with<G: NarrativeGenerator + 'static>(generator: G) -> Harness<G> {
    let catalog = Arc::new(InMemoryCatalog {
        questions: technical_catalog(),
        personality: personality_catalog(),
    });
    let store = Arc::new(InMemoryStore::default());
    let generator = Arc::new(generator);
    let state = AppState::with_collaborators(catalog, store.clone(), generator.clone(), 30);
    Harness {
        state,
        store,
        generator,
    }
}

pub const NARRATIVE: &str = r#"{
    "technicalAnalysis": "Consistent results across categories.",
    "personalityAnalysis": "Balanced profile.",
    "strengths": ["Databases", "Networking"],
    "weaknesses": "Cloud operations",
    "overallAssessment": "Solid candidate.",
    "interviewFocus": "Cloud cost control",
    "recommendation": "medium",
    "recommendationReason": "Good fundamentals with gaps in operations."
}"#;
