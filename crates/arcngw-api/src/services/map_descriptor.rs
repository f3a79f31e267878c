use arcngw_core::error::{NgwError, Result};
use arcngw_core::models::WebMapItem;
use serde::Serialize;

use crate::dto::{LayerEntry, LayerList, MapCapabilities, SpatialReference};
use crate::state::AppState;

const CURRENT_VERSION: f64 = 10.2;
const CAPABILITIES: &str = "Map,Query,Data";
const MAP_NAME: &str = "Layers";
const UNITS: &str = "esriDecimalDegrees";
const QUERY_FORMATS: &str = "JSON,AMF";
const IMAGE_FORMATS: &str = "PNG32,PNG24,PNG,JPG,DIB,TIFF,EMF,PS,PDF,GIF,SVG,SVGZ,BMP";

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MapDocument {
    Capabilities(MapCapabilities),
    Layers(LayerList),
}

/// Service projecting backend web maps onto MapServer documents
pub struct MapDescriptorBuilder;

impl MapDescriptorBuilder {
    /// Capabilities document when `full`, bare layer list otherwise
    pub async fn describe_map(state: &AppState, map_id: u64, full: bool) -> Result<MapDocument> {
        state.ngw.session.ensure_authenticated().await?;

        let resource = state.ngw.directory.describe(map_id).await?;
        let webmap = resource.webmap.as_ref().ok_or_else(|| {
            tracing::warn!(map_id, class = %resource.class, "Resource is not a web map");
            NgwError::not_found(map_id)
        })?;

        let layers = Self::layer_entries(&webmap.root_item);
        tracing::debug!(map_id, layers = layers.len(), full, "Described web map");

        if !full {
            return Ok(MapDocument::Layers(LayerList { layers, tables: Vec::new() }));
        }

        Ok(MapDocument::Capabilities(MapCapabilities {
            copyright_text: resource.display_name.clone(),
            current_version: CURRENT_VERSION,
            capabilities: CAPABILITIES,
            map_name: MAP_NAME,
            description: "",
            spatial_reference: SpatialReference { wkid: state.projection.map_wkid },
            supports_dynamic_layers: true,
            export_tiles_allowed: false,
            units: UNITS,
            supported_query_formats: QUERY_FORMATS,
            supported_image_format_types: IMAGE_FORMATS,
            layers,
            tables: Vec::new(),
        }))
    }

    /// Layer items of the tree in tree order; groups contribute their children
    pub fn layer_entries(root: &WebMapItem) -> Vec<LayerEntry> {
        root.layers()
            .into_iter()
            .filter_map(|item| {
                Some(LayerEntry {
                    id: item.layer_style_id?,
                    name: item.display_name.clone(),
                    max_scale: item.layer_max_scale_denom,
                    min_scale: item.layer_min_scale_denom,
                    default_visibility: item.layer_enabled,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layer_entries_flatten_groups() {
        let root: WebMapItem = serde_json::from_value(json!({
            "item_type": "root",
            "children": [
                {"item_type": "layer", "display_name": "Roads", "layer_style_id": 4,
                 "layer_max_scale_denom": 1000.0, "layer_enabled": true},
                {"item_type": "group", "display_name": "Water", "children": [
                    {"item_type": "layer", "display_name": "Rivers", "layer_style_id": 9,
                     "layer_enabled": false}
                ]}
            ]
        }))
        .unwrap();

        let entries = MapDescriptorBuilder::layer_entries(&root);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, 4);
        assert_eq!(entries[0].max_scale, Some(1000.0));
        assert_eq!(entries[1].name.as_deref(), Some("Rivers"));
        assert_eq!(entries[1].default_visibility, Some(false));
    }

    #[test]
    fn test_layer_entry_serializes_camel_case() {
        let entry = LayerEntry {
            id: 1,
            name: Some("A".to_string()),
            max_scale: None,
            min_scale: Some(500.0),
            default_visibility: Some(true),
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"id": 1, "name": "A", "maxScale": null, "minScale": 500.0, "defaultVisibility": true})
        );
    }
}
