//! Error types for arcngw

use thiserror::Error;

/// Every failure the gateway core can report.
///
/// The enum is `Clone` so that one login outcome can be handed to every
/// caller waiting on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NgwError {
    // Backend session errors
    #[error("Authentication failed: {reason}")]
    Auth { reason: String },

    // Resource lookup errors
    #[error("Resource not found: {resource_id}")]
    NotFound { resource_id: String, status: Option<u16> },

    // Request shape errors
    #[error("{message}")]
    Validation { message: String, hint: Option<String> },

    #[error("Invalid geometry: {reason}")]
    Geometry { reason: String },

    // Backend call errors
    #[error("Server returned {status} response status code")]
    Upstream { status: u16 },

    #[error("Backend request failed: {reason}")]
    Transport { reason: String, timed_out: bool },

    #[error("Malformed backend response: {reason}")]
    MalformedReply { reason: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },
}

impl NgwError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), hint: None }
    }

    pub fn geometry(reason: impl Into<String>) -> Self {
        Self::Geometry { reason: reason.into() }
    }

    pub fn not_found(resource_id: impl ToString) -> Self {
        Self::NotFound { resource_id: resource_id.to_string(), status: None }
    }

    /// Attach a documentation hint to a validation error.
    pub fn with_hint(self, hint: impl Into<String>) -> Self {
        match self {
            Self::Validation { message, .. } => Self::Validation { message, hint: Some(hint.into()) },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, NgwError>;
