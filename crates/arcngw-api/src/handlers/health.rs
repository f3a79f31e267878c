use std::sync::Arc;

use arcngw_client::auth::SessionState;
use axum::{extract::State, Json};

use crate::dto::HealthResponse;
use crate::state::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let session = match state.ngw.session.state() {
        SessionState::Unauthenticated => "unauthenticated",
        SessionState::LoggingIn => "logging_in",
        SessionState::Authenticated => "authenticated",
    };
    Json(HealthResponse { session, ..HealthResponse::default() })
}
