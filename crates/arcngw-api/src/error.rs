use arcngw_core::error::NgwError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::jsonp::Callback;

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
    pub callback: Option<Callback>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), details: None, callback: None }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Frame the error body for a JSONP caller
    pub fn with_callback(mut self, callback: Option<&Callback>) -> Self {
        self.callback = callback.cloned();
        self
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            status: self.status.as_u16(),
            details: self.details,
        };
        match self.callback {
            Some(callback) => match serde_json::to_string(&body) {
                Ok(json) => callback.respond(self.status, &json),
                Err(_) => (self.status, Json(body)).into_response(),
            },
            None => (self.status, Json(body)).into_response(),
        }
    }
}

impl From<NgwError> for ApiError {
    fn from(err: NgwError) -> Self {
        let status = match &err {
            NgwError::Validation { .. } | NgwError::Geometry { .. } => StatusCode::BAD_REQUEST,
            NgwError::NotFound { .. } => StatusCode::NOT_FOUND,
            NgwError::Transport { timed_out: true, .. } => StatusCode::GATEWAY_TIMEOUT,
            NgwError::Auth { .. }
            | NgwError::Upstream { .. }
            | NgwError::Transport { .. }
            | NgwError::MalformedReply { .. } => StatusCode::BAD_GATEWAY,
            NgwError::ConfigMissing { .. } | NgwError::ConfigInvalid { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        match err {
            NgwError::Validation { message, hint } => {
                let error = Self::new(status, message);
                match hint {
                    Some(hint) => error.with_details(hint),
                    None => error,
                }
            }
            other => Self::new(status, other.to_string()),
        }
    }
}
