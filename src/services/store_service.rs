use crate::error::{Error, Result};
use crate::models::applicant::{Applicant, NewApplicant};
use crate::models::personality::PersonalityTestRecord;
use crate::models::report::AssessmentReport;
use crate::models::technical_result::TechnicalTestRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// Persistence of applicants and their per-test records. Each save replaces
/// the stored document for that applicant.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn create_applicant(&self, applicant: &NewApplicant) -> Result<Applicant>;

    /// Fails with `NotFound` for an unknown id.
    async fn get_applicant(&self, id: Uuid) -> Result<Applicant>;

    async fn save_technical(&self, applicant_id: Uuid, record: &TechnicalTestRecord) -> Result<()>;

    async fn get_technical(&self, applicant_id: Uuid) -> Result<Option<TechnicalTestRecord>>;

    async fn save_personality(
        &self,
        applicant_id: Uuid,
        record: &PersonalityTestRecord,
    ) -> Result<()>;

    async fn get_personality(&self, applicant_id: Uuid) -> Result<Option<PersonalityTestRecord>>;

    /// Stores the report unless the stored one was built from newer records
    /// than `source_at`. Returns whether the report was stored.
    async fn save_report(
        &self,
        applicant_id: Uuid,
        report: &AssessmentReport,
        source_at: DateTime<Utc>,
    ) -> Result<bool>;

    async fn get_report(&self, applicant_id: Uuid) -> Result<Option<AssessmentReport>>;
}

#[derive(Clone)]
pub struct PgAssessmentStore {
    pool: PgPool,
}

impl PgAssessmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssessmentStore for PgAssessmentStore {
    async fn create_applicant(&self, applicant: &NewApplicant) -> Result<Applicant> {
        let row = sqlx::query_as::<_, Applicant>(
            r#"
            INSERT INTO applicants (id, name, email, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, phone, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&applicant.name)
        .bind(&applicant.email)
        .bind(&applicant.phone)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(applicant_id = %row.id, "applicant registered");
        Ok(row)
    }

    async fn get_applicant(&self, id: Uuid) -> Result<Applicant> {
        sqlx::query_as::<_, Applicant>(
            "SELECT id, name, email, phone, created_at FROM applicants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Applicant {} not found", id)))
    }

    async fn save_technical(&self, applicant_id: Uuid, record: &TechnicalTestRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO technical_results (applicant_id, record, score, max_score, submitted_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (applicant_id) DO UPDATE
            SET record = EXCLUDED.record,
                score = EXCLUDED.score,
                max_score = EXCLUDED.max_score,
                submitted_at = EXCLUDED.submitted_at
            "#,
        )
        .bind(applicant_id)
        .bind(Json(record))
        .bind(record.score)
        .bind(record.max_score)
        .bind(record.submitted_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_technical(&self, applicant_id: Uuid) -> Result<Option<TechnicalTestRecord>> {
        let row: Option<Json<TechnicalTestRecord>> =
            sqlx::query_scalar("SELECT record FROM technical_results WHERE applicant_id = $1")
                .bind(applicant_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(record)| record))
    }

    async fn save_personality(
        &self,
        applicant_id: Uuid,
        record: &PersonalityTestRecord,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO personality_results (applicant_id, record, total, submitted_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (applicant_id) DO UPDATE
            SET record = EXCLUDED.record,
                total = EXCLUDED.total,
                submitted_at = EXCLUDED.submitted_at
            "#,
        )
        .bind(applicant_id)
        .bind(Json(record))
        .bind(record.scores.total)
        .bind(record.submitted_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_personality(&self, applicant_id: Uuid) -> Result<Option<PersonalityTestRecord>> {
        let row: Option<Json<PersonalityTestRecord>> =
            sqlx::query_scalar("SELECT record FROM personality_results WHERE applicant_id = $1")
                .bind(applicant_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(record)| record))
    }

    async fn save_report(
        &self,
        applicant_id: Uuid,
        report: &AssessmentReport,
        source_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO ai_reports (applicant_id, report, ai_status, generated_at, source_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (applicant_id) DO UPDATE
            SET report = EXCLUDED.report,
                ai_status = EXCLUDED.ai_status,
                generated_at = EXCLUDED.generated_at,
                source_at = EXCLUDED.source_at
            WHERE ai_reports.source_at <= EXCLUDED.source_at
            "#,
        )
        .bind(applicant_id)
        .bind(Json(report))
        .bind(report.ai_status.as_str())
        .bind(report.generated_at)
        .bind(source_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_report(&self, applicant_id: Uuid) -> Result<Option<AssessmentReport>> {
        let row: Option<Json<AssessmentReport>> =
            sqlx::query_scalar("SELECT report FROM ai_reports WHERE applicant_id = $1")
                .bind(applicant_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(report)| report))
    }
}
