//! arcngw Client - NextGIS Web backend access
//!
//! This crate defines the backend port, its reqwest adapter and an in-memory
//! fake, plus the shared authentication session and resource lookups built
//! on top of them.

pub mod auth;
pub mod directory;
pub mod http;
pub mod memory;
pub mod ports;

use std::sync::Arc;

use arcngw_core::config::BackendConfig;
use arcngw_core::error::Result;

pub use auth::AuthSession;
pub use directory::ResourceDirectory;
pub use http::HttpBackend;
pub use memory::MemoryBackend;
pub use ports::{BackendReply, Credentials, IdentifyRequest, ImageReply, NgwBackend, RenderRequest, Ticket};

/// Backend handle shared by every request: port, session and directory
#[derive(Clone)]
pub struct NgwClient {
    pub backend: Arc<dyn NgwBackend>,
    pub session: Arc<AuthSession>,
    pub directory: ResourceDirectory,
}

impl NgwClient {
    pub fn new(backend: Arc<dyn NgwBackend>, credentials: Credentials) -> Self {
        let session = Arc::new(AuthSession::new(backend.clone(), credentials));
        let directory = ResourceDirectory::new(backend.clone(), session.clone());
        Self { backend, session, directory }
    }

    /// Build a client talking HTTP to the configured backend
    pub fn connect(config: &BackendConfig) -> Result<Self> {
        let backend = HttpBackend::new(config)?;
        let credentials = Credentials::new(&config.login, &config.password);
        Ok(Self::new(Arc::new(backend), credentials))
    }
}
