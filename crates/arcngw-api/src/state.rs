use arcngw_client::NgwClient;
use arcngw_core::config::GatewayConfig;
use arcngw_core::error::Result;

/// Spatial references the gateway translates between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionSettings {
    /// SRS of coordinates sent by clients
    pub client_srs: u32,
    /// SRS the backend stores and queries in
    pub backend_srs: u32,
    /// wkid advertised in capabilities documents
    pub map_wkid: u32,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self { client_srs: 4326, backend_srs: 3857, map_wkid: 28417 }
    }
}

impl From<&GatewayConfig> for ProjectionSettings {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            client_srs: config.client_srs,
            backend_srs: config.ngw.srs,
            map_wkid: config.map_wkid,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub ngw: NgwClient,
    pub projection: ProjectionSettings,
}

impl AppState {
    pub fn new(ngw: NgwClient, projection: ProjectionSettings) -> Self {
        Self { ngw, projection }
    }

    /// Connect to the configured backend over HTTP
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        Ok(Self::new(NgwClient::connect(&config.ngw)?, ProjectionSettings::from(config)))
    }
}
