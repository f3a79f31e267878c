use async_trait::async_trait;
use arcngw_core::error::Result;
use arcngw_core::models::{FeaturePayload, FeatureTarget};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Backend account used for login
#[derive(Clone)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self { login: login.into(), password: password.into() }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Session ticket issued by the backend (the `tkt` cookie)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl Ticket {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self { value: value.into(), expires_at }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Status and decoded body of a backend JSON call
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReply {
    pub status: u16,
    pub body: Value,
}

impl BackendReply {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The backend rejected the session ticket
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, 401 | 403)
    }
}

/// Raw image returned by the backend renderer
#[derive(Debug, Clone, PartialEq)]
pub struct ImageReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Body of `POST /feature_layer/identify`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifyRequest {
    pub srs: u32,
    pub geom: String,
    pub layers: Vec<u64>,
}

/// Query of `GET /api/component/render/image`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderRequest {
    pub extent: String,
    pub size: String,
    pub resource: String,
}

/// Port for the NextGIS Web backend API
#[async_trait]
pub trait NgwBackend: Send + Sync {
    /// Exchange credentials for a session ticket
    async fn login(&self, credentials: &Credentials) -> Result<Ticket>;

    /// Fetch a resource document
    async fn get_resource(&self, ticket: &Ticket, resource_id: u64) -> Result<BackendReply>;

    /// Create a feature, or update it when the target names one
    async fn save_feature(
        &self,
        ticket: &Ticket,
        target: FeatureTarget,
        payload: &FeaturePayload,
    ) -> Result<BackendReply>;

    /// Run a spatial identify query
    async fn identify(&self, ticket: &Ticket, request: &IdentifyRequest) -> Result<BackendReply>;

    /// Render a map image
    async fn render_image(&self, ticket: &Ticket, request: &RenderRequest) -> Result<ImageReply>;
}
