pub mod admin;
pub mod extract;
pub mod health;
pub mod public;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let public_api = Router::new()
        .route("/api/applicants", post(public::create_applicant))
        .route("/api/tests/technical", get(public::get_technical_test))
        .route("/api/tests/personality", get(public::get_personality_test))
        .route(
            "/api/applicants/:id/technical",
            post(public::submit_technical),
        )
        .route(
            "/api/applicants/:id/personality",
            post(public::submit_personality),
        );

    let admin_api = Router::new()
        .route(
            "/api/admin/applicants/:id/results",
            get(admin::get_results),
        )
        .route(
            "/api/admin/applicants/:id/report",
            get(admin::get_report).post(admin::regenerate_report),
        );

    Router::new()
        .route("/health", get(health::health))
        .merge(public_api)
        .merge(admin_api)
        .with_state(state)
}

/// The router with the layers the server runs behind.
pub fn app(state: AppState) -> Router {
    router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
    )
}
