use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use serde::Serialize;

use crate::{
    AppState,
    session::Session,
    utils::{EmptyResponse, success_to_api_response},
};

#[derive(Serialize)]
pub struct ServiceInfo {
    pub service: String,
    pub status: String,
    pub timestamp: i64,
}

/// Home page: service identity and liveness.
pub async fn index() -> impl IntoResponse {
    let now = chrono::Utc::now();

    (
        StatusCode::OK,
        success_to_api_response(ServiceInfo {
            service: "bloodbridge-backend".to_string(),
            status: "ok".to_string(),
            timestamp: now.timestamp(),
        }),
    )
}

/// Unmatched paths land back on the home page.
pub async fn not_found() -> Redirect {
    Redirect::to("/")
}

#[axum::debug_handler]
pub async fn logout(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    state.sessions.logout(&session.session_id).await;
    (StatusCode::OK, success_to_api_response(EmptyResponse {}))
}
