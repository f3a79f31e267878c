//! JSONP response framing.
//!
//! ArcGIS clients pass `callback=<name>` and expect `<name>(<json>)` back
//! as a script. Without a callback the body is plain JSON.

use arcngw_core::error::{NgwError, Result};
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::ApiError;

const SCRIPT_CONTENT_TYPE: &str = "application/javascript; charset=utf-8";

/// Validated JSONP callback name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback(String);

impl Callback {
    /// `None` or an empty name means plain JSON
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>> {
        let name = match raw.map(str::trim) {
            None | Some("") => return Ok(None),
            Some(name) => name,
        };
        if name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$')) {
            Ok(Some(Self(name.to_string())))
        } else {
            Err(NgwError::validation(format!("Invalid callback name '{}'", name)))
        }
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// `name(body)` served as a script
    pub fn respond(&self, status: StatusCode, body: &str) -> Response {
        (status, [(header::CONTENT_TYPE, SCRIPT_CONTENT_TYPE)], format!("{}({})", self.0, body))
            .into_response()
    }
}

/// JSON body, wrapped in the callback when one was given
pub struct Jsonp<T> {
    pub callback: Option<Callback>,
    pub body: T,
}

impl<T: Serialize> Jsonp<T> {
    pub fn new(callback: Option<Callback>, body: T) -> Self {
        Self { callback, body }
    }
}

impl<T: Serialize> IntoResponse for Jsonp<T> {
    fn into_response(self) -> Response {
        let Some(callback) = self.callback else {
            return Json(self.body).into_response();
        };
        match serde_json::to_string(&self.body) {
            Ok(json) => callback.respond(StatusCode::OK, &json),
            Err(e) => ApiError::internal("Failed to serialize response")
                .with_details(e.to_string())
                .with_callback(Some(&callback))
                .into_response(),
        }
    }
}
