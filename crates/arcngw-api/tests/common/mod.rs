//! Shared fixtures: an application state backed by the in-memory backend

#![allow(dead_code)]

use std::sync::Arc;

use arcngw_api::{AppState, ProjectionSettings};
use arcngw_client::{Credentials, MemoryBackend, NgwClient};
use serde_json::json;

pub const POINT_LAYER: u64 = 10;
pub const POLYGON_LAYER: u64 = 11;
pub const WEB_MAP: u64 = 5;
pub const ORPHAN_STYLE: u64 = 23;

/// Backend seeded with two layers, their styles and one web map
pub fn seeded_backend() -> MemoryBackend {
    let backend = MemoryBackend::new();

    backend.insert_resource(
        POINT_LAYER,
        json!({
            "resource": {"id": POINT_LAYER, "cls": "postgis_layer", "display_name": "Wells", "parent": {"id": 1}},
            "postgis_layer": {"geometry_type": "POINT"}
        }),
    );
    backend.insert_resource(
        POLYGON_LAYER,
        json!({
            "resource": {"id": POLYGON_LAYER, "cls": "vector_layer", "display_name": "Parcels", "parent": {"id": 1}},
            "vector_layer": {"geometry_type": "POLYGON"}
        }),
    );
    for (style, layer) in [(20, POINT_LAYER), (21, POLYGON_LAYER), (22, POINT_LAYER)] {
        backend.insert_resource(
            style,
            json!({"resource": {"id": style, "cls": "mapserver_style", "display_name": "Style", "parent": {"id": layer}}}),
        );
    }
    backend.insert_resource(
        ORPHAN_STYLE,
        json!({"resource": {"id": ORPHAN_STYLE, "cls": "mapserver_style", "display_name": "Lost", "parent": null}}),
    );
    backend.insert_resource(
        WEB_MAP,
        json!({
            "resource": {"id": WEB_MAP, "cls": "webmap", "display_name": "City map", "parent": {"id": 0}},
            "webmap": {"root_item": {"item_type": "root", "children": [
                {"item_type": "layer", "display_name": "Wells", "layer_style_id": 20,
                 "layer_max_scale_denom": null, "layer_min_scale_denom": 50000.0, "layer_enabled": true},
                {"item_type": "group", "display_name": "Cadastre", "children": [
                    {"item_type": "layer", "display_name": "Parcels", "layer_style_id": 21,
                     "layer_enabled": false}
                ]}
            ]}}
        }),
    );

    backend
}

pub fn state_for(backend: &MemoryBackend) -> Arc<AppState> {
    let client = NgwClient::new(Arc::new(backend.clone()), Credentials::new("admin", "secret"));
    Arc::new(AppState::new(client, ProjectionSettings::default()))
}
