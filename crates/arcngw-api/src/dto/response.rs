use serde::Serialize;
use serde_json::Value;

/// Result of a feature save; backend failures are reported in-band
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub response: Value,
}

/// One entry of a MapServer layer list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerEntry {
    pub id: u64,
    pub name: Option<String>,
    pub max_scale: Option<f64>,
    pub min_scale: Option<f64>,
    pub default_visibility: Option<bool>,
}

/// `/{map}/MapServer/layers` document
#[derive(Debug, Serialize)]
pub struct LayerList {
    pub layers: Vec<LayerEntry>,
    pub tables: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct SpatialReference {
    pub wkid: u32,
}

/// `/{map}/MapServer` capabilities document
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapCapabilities {
    pub copyright_text: String,
    pub current_version: f64,
    pub capabilities: &'static str,
    pub map_name: &'static str,
    pub description: &'static str,
    pub spatial_reference: SpatialReference,
    pub supports_dynamic_layers: bool,
    pub export_tiles_allowed: bool,
    pub units: &'static str,
    pub supported_query_formats: &'static str,
    pub supported_image_format_types: &'static str,
    pub layers: Vec<LayerEntry>,
    pub tables: Vec<Value>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub session: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "ok", service: "arcngw-api", session: "unauthenticated" }
    }
}
