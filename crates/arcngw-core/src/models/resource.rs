//! Backend resource descriptors.
//!
//! Descriptors are parsed from `GET /api/resource/{id}` documents and live
//! for a single request only.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{NgwError, Result};
use crate::models::geometry::GeometryKind;

/// Typed view of a backend resource document
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    pub id: u64,
    pub class: String,
    pub display_name: String,
    pub parent_id: Option<u64>,
    pub geometry_type: Option<GeometryKind>,
    pub webmap: Option<WebMap>,
}

/// Web map section of a resource document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebMap {
    pub root_item: WebMapItem,
}

/// Node of the web map layer tree (root, group or layer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebMapItem {
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub layer_style_id: Option<u64>,
    #[serde(default)]
    pub layer_max_scale_denom: Option<f64>,
    #[serde(default)]
    pub layer_min_scale_denom: Option<f64>,
    #[serde(default)]
    pub layer_enabled: Option<bool>,
    #[serde(default)]
    pub children: Vec<WebMapItem>,
}

impl WebMapItem {
    /// Layer items of the subtree in depth-first tree order, groups skipped
    pub fn layers(&self) -> Vec<&WebMapItem> {
        let mut layers = Vec::new();
        let mut stack: Vec<&WebMapItem> = self.children.iter().rev().collect();
        while let Some(item) = stack.pop() {
            if item.layer_style_id.is_some() {
                layers.push(item);
            }
            stack.extend(item.children.iter().rev());
        }
        layers
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    resource: RawResource,
    #[serde(default)]
    postgis_layer: Option<RawLayer>,
    #[serde(default)]
    vector_layer: Option<RawLayer>,
    #[serde(default)]
    webmap: Option<WebMap>,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    id: u64,
    #[serde(default)]
    cls: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    parent: Option<RawParent>,
}

#[derive(Debug, Deserialize)]
struct RawParent {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RawLayer {
    #[serde(default)]
    geometry_type: Option<String>,
}

impl ResourceDescriptor {
    /// Parse a backend resource document
    pub fn from_json(value: &Value) -> Result<Self> {
        let raw: RawDocument = serde_json::from_value(value.clone()).map_err(|e| {
            tracing::warn!(error = %e, "Malformed resource document");
            NgwError::NotFound {
                resource_id: value
                    .pointer("/resource/id")
                    .map(Value::to_string)
                    .unwrap_or_else(|| "unknown".to_string()),
                status: None,
            }
        })?;

        let geometry_type = raw
            .postgis_layer
            .iter()
            .chain(raw.vector_layer.iter())
            .filter_map(|layer| layer.geometry_type.as_deref())
            .find_map(GeometryKind::from_backend);

        Ok(Self {
            id: raw.resource.id,
            class: raw.resource.cls,
            display_name: raw.resource.display_name,
            parent_id: raw.resource.parent.map(|p| p.id),
            geometry_type,
            webmap: raw.webmap,
        })
    }
}
