use std::sync::Arc;

use arcngw_core::error::{NgwError, Result};
use arcngw_core::models::ResourceDescriptor;

use crate::auth::AuthSession;
use crate::ports::NgwBackend;

/// Typed, uncached access to backend resources
#[derive(Clone)]
pub struct ResourceDirectory {
    backend: Arc<dyn NgwBackend>,
    session: Arc<AuthSession>,
}

impl ResourceDirectory {
    pub fn new(backend: Arc<dyn NgwBackend>, session: Arc<AuthSession>) -> Self {
        Self { backend, session }
    }

    /// Fetch and parse one resource; any non-success answer is `NotFound`
    pub async fn describe(&self, resource_id: u64) -> Result<ResourceDescriptor> {
        let ticket = self.session.ensure_authenticated().await?;
        let reply = self.backend.get_resource(&ticket, resource_id).await?;

        if !reply.is_success() {
            if reply.is_unauthorized() {
                self.session.invalidate(&ticket);
            }
            tracing::warn!(resource_id, status = reply.status, "Resource lookup failed");
            return Err(NgwError::NotFound {
                resource_id: resource_id.to_string(),
                status: Some(reply.status),
            });
        }

        ResourceDescriptor::from_json(&reply.body)
    }
}
