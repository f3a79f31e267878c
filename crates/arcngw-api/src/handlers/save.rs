use std::sync::Arc;

use arcngw_core::error::NgwError;
use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

use crate::dto::SaveResponse;
use crate::error::ApiError;
use crate::services::FeatureWriter;
use crate::state::AppState;

pub async fn save_feature(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SaveResponse>, ApiError> {
    let body: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Save body is not JSON");
        NgwError::validation("Invalid request body").with_hint("Expected dict")
    })?;

    let response = FeatureWriter::save(&state, body).await?;
    Ok(Json(response))
}
