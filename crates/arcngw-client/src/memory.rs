//! In-memory backend for development and testing.
//!
//! This implementation uses `RwLock::unwrap()` intentionally. A poisoned
//! lock means a test already panicked while holding it.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use arcngw_core::error::{NgwError, Result};
use arcngw_core::models::{FeaturePayload, FeatureTarget};
use chrono::{TimeDelta, Utc};
use serde_json::{json, Value};

use crate::ports::{
    BackendReply, Credentials, IdentifyRequest, ImageReply, NgwBackend, RenderRequest, Ticket,
};

/// A backend call as the fake received it
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    GetResource(u64),
    SaveFeature { target: FeatureTarget, payload: Value },
    Identify(IdentifyRequest),
    RenderImage(RenderRequest),
}

#[derive(Debug)]
struct MemoryState {
    resources: HashMap<u64, Value>,
    issued: HashSet<String>,
    login_calls: usize,
    login_delay: Duration,
    reject_login: bool,
    ticket_lifetime: TimeDelta,
    identify_reply: BackendReply,
    save_reply: BackendReply,
    image_reply: ImageReply,
    calls: Vec<RecordedCall>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            resources: HashMap::new(),
            issued: HashSet::new(),
            login_calls: 0,
            login_delay: Duration::ZERO,
            reject_login: false,
            ticket_lifetime: TimeDelta::hours(1),
            identify_reply: BackendReply::ok(json!({"featureCount": 0})),
            save_reply: BackendReply::ok(json!({"id": 1})),
            image_reply: ImageReply {
                status: 200,
                content_type: Some("image/png".to_string()),
                bytes: Vec::new(),
            },
            calls: Vec::new(),
        }
    }
}

/// In-memory implementation of NgwBackend
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` from `GET /api/resource/{id}`
    pub fn insert_resource(&self, id: u64, document: Value) {
        self.state.write().unwrap().resources.insert(id, document);
    }

    pub fn set_login_rejected(&self, rejected: bool) {
        self.state.write().unwrap().reject_login = rejected;
    }

    pub fn set_login_delay(&self, delay: Duration) {
        self.state.write().unwrap().login_delay = delay;
    }

    pub fn set_ticket_lifetime(&self, lifetime: TimeDelta) {
        self.state.write().unwrap().ticket_lifetime = lifetime;
    }

    pub fn set_identify_reply(&self, reply: BackendReply) {
        self.state.write().unwrap().identify_reply = reply;
    }

    pub fn set_save_reply(&self, reply: BackendReply) {
        self.state.write().unwrap().save_reply = reply;
    }

    pub fn set_image_reply(&self, reply: ImageReply) {
        self.state.write().unwrap().image_reply = reply;
    }

    /// Forget every issued ticket, as a backend restart would
    pub fn revoke_tickets(&self) {
        self.state.write().unwrap().issued.clear();
    }

    pub fn login_calls(&self) -> usize {
        self.state.read().unwrap().login_calls
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.read().unwrap().calls.clone()
    }

    /// Record the call and report whether the ticket is still honoured
    fn accept(&self, ticket: &Ticket, call: RecordedCall) -> bool {
        let mut state = self.state.write().unwrap();
        state.calls.push(call);
        state.issued.contains(&ticket.value)
    }
}

fn unauthorized() -> BackendReply {
    BackendReply::new(401, json!({"message": "Unauthorized"}))
}

#[async_trait]
impl NgwBackend for MemoryBackend {
    async fn login(&self, credentials: &Credentials) -> Result<Ticket> {
        let delay = {
            let mut state = self.state.write().unwrap();
            state.login_calls += 1;
            state.login_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.write().unwrap();
        if state.reject_login {
            return Err(NgwError::Auth {
                reason: format!("login returned 401 response status code for {}", credentials.login),
            });
        }

        let ticket =
            Ticket::new(format!("ticket-{}", state.login_calls), Utc::now() + state.ticket_lifetime);
        state.issued.insert(ticket.value.clone());
        Ok(ticket)
    }

    async fn get_resource(&self, ticket: &Ticket, resource_id: u64) -> Result<BackendReply> {
        if !self.accept(ticket, RecordedCall::GetResource(resource_id)) {
            return Ok(unauthorized());
        }
        let state = self.state.read().unwrap();
        Ok(match state.resources.get(&resource_id) {
            Some(document) => BackendReply::ok(document.clone()),
            None => BackendReply::new(404, json!({"message": "Resource not found"})),
        })
    }

    async fn save_feature(
        &self,
        ticket: &Ticket,
        target: FeatureTarget,
        payload: &FeaturePayload,
    ) -> Result<BackendReply> {
        let payload = serde_json::to_value(payload).map_err(|e| NgwError::Transport {
            reason: e.to_string(),
            timed_out: false,
        })?;
        if !self.accept(ticket, RecordedCall::SaveFeature { target, payload }) {
            return Ok(unauthorized());
        }
        Ok(self.state.read().unwrap().save_reply.clone())
    }

    async fn identify(&self, ticket: &Ticket, request: &IdentifyRequest) -> Result<BackendReply> {
        if !self.accept(ticket, RecordedCall::Identify(request.clone())) {
            return Ok(unauthorized());
        }
        Ok(self.state.read().unwrap().identify_reply.clone())
    }

    async fn render_image(&self, ticket: &Ticket, request: &RenderRequest) -> Result<ImageReply> {
        if !self.accept(ticket, RecordedCall::RenderImage(request.clone())) {
            return Ok(ImageReply { status: 401, content_type: None, bytes: Vec::new() });
        }
        Ok(self.state.read().unwrap().image_reply.clone())
    }
}
