use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use crate::dto::admin_dto::ApplicantResultsResponse;
use crate::models::report::AssessmentReport;
use crate::AppState;

#[axum::debug_handler]
pub async fn get_results(
    State(state): State<AppState>,
    Path(applicant_id): Path<Uuid>,
) -> crate::error::Result<Json<ApplicantResultsResponse>> {
    let applicant = state.store.get_applicant(applicant_id).await?;
    let results = state.report_service.load_results(applicant_id).await?;
    Ok(Json(ApplicantResultsResponse { applicant, results }))
}

#[axum::debug_handler]
pub async fn get_report(
    State(state): State<AppState>,
    Path(applicant_id): Path<Uuid>,
) -> crate::error::Result<Json<AssessmentReport>> {
    let report = state.report_service.get_report(applicant_id).await?;
    Ok(Json(report))
}

/// Regenerates synchronously and replaces the stored report.
#[axum::debug_handler]
pub async fn regenerate_report(
    State(state): State<AppState>,
    Path(applicant_id): Path<Uuid>,
) -> crate::error::Result<Json<AssessmentReport>> {
    tracing::info!(%applicant_id, "report regeneration requested");
    let report = state.report_service.generate_for(applicant_id).await?;
    Ok(Json(report))
}
