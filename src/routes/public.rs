use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use super::extract::AppJson;
use uuid::Uuid;
use validator::Validate;

use crate::dto::public_dto::{
    CreateApplicantRequest, CreateApplicantResponse, PersonalityTestResponse,
    SubmitPersonalityRequest, SubmitPersonalityResponse, SubmitTechnicalRequest,
    SubmitTechnicalResponse, TechnicalTestResponse,
};
use crate::AppState;

#[axum::debug_handler]
pub async fn create_applicant(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateApplicantRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let applicant = state.test_service.register_applicant(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateApplicantResponse { id: applicant.id }),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn get_technical_test(
    State(state): State<AppState>,
) -> crate::error::Result<Json<TechnicalTestResponse>> {
    let questions = state.test_service.draw_technical_instance().await?;
    Ok(Json(TechnicalTestResponse {
        total_questions: questions.len(),
        questions,
    }))
}

#[axum::debug_handler]
pub async fn submit_technical(
    State(state): State<AppState>,
    Path(applicant_id): Path<Uuid>,
    AppJson(req): AppJson<SubmitTechnicalRequest>,
) -> crate::error::Result<Json<SubmitTechnicalResponse>> {
    req.validate()?;
    let (submission, instance_ids) = req.into_parts();
    let record = state
        .test_service
        .submit_technical(applicant_id, submission, instance_ids)
        .await?;
    Ok(Json(SubmitTechnicalResponse {
        score: record.score,
        max_score: record.max_score,
        percentage: record.percentage(),
    }))
}

#[axum::debug_handler]
pub async fn get_personality_test(
    State(state): State<AppState>,
) -> crate::error::Result<Json<PersonalityTestResponse>> {
    let items = state.test_service.personality_items().await?;
    Ok(Json(PersonalityTestResponse {
        total_questions: items.len(),
        items,
    }))
}

#[axum::debug_handler]
pub async fn submit_personality(
    State(state): State<AppState>,
    Path(applicant_id): Path<Uuid>,
    AppJson(req): AppJson<SubmitPersonalityRequest>,
) -> crate::error::Result<Json<SubmitPersonalityResponse>> {
    req.validate()?;
    let answers = req.answers.unwrap_or_default();
    let record = state
        .test_service
        .submit_personality(applicant_id, answers)
        .await?;
    Ok(Json(SubmitPersonalityResponse {
        answered: record.details.len(),
        scores: record.scores,
    }))
}
