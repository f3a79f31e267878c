use arcngw_core::error::{NgwError, Result};
use arcngw_core::models::{
    invalid_geometry, ConsumptionOrder, FeatureExtensions, FeaturePayload, GeometryField,
    GeometryKind, SaveRequest, Shape,
};
use arcngw_geo::codec::inferred_shape;
use arcngw_geo::{reproject_tree, to_coordinate_tree};
use serde_json::Value;

use crate::dto::SaveResponse;
use crate::state::{AppState, ProjectionSettings};

/// Service for feature create/update
pub struct FeatureWriter;

impl FeatureWriter {
    /// Validate a save body, encode its geometry and send it to the backend.
    ///
    /// A backend rejection of the write itself is reported in-band through
    /// `success: false`.
    pub async fn save(state: &AppState, body: Value) -> Result<SaveResponse> {
        state.ngw.session.ensure_authenticated().await?;

        let request = SaveRequest::from_json(body)?;
        let target = request.target();
        tracing::info!(
            layer = target.layer,
            feature_id = ?target.feature_id,
            has_geometry = request.geometry().is_some(),
            "Saving feature"
        );

        let layer = state.ngw.directory.describe(target.layer).await?;
        let geom = match request.geometry() {
            Some(field) => Some(
                Self::encode_geometry(field, layer.geometry_type, &state.projection)
                    .map_err(|e| invalid_geometry(geometry_reason(e)))?,
            ),
            None => None,
        };

        let payload = FeaturePayload {
            extensions: FeatureExtensions::default(),
            fields: request.into_fields(),
            geom,
        };

        let ticket = state.ngw.session.ensure_authenticated().await?;
        let reply = state.ngw.backend.save_feature(&ticket, target, &payload).await?;
        if reply.is_unauthorized() {
            state.ngw.session.invalidate(&ticket);
        }
        if reply.status != 200 {
            tracing::warn!(layer = target.layer, status = reply.status, "Backend rejected feature");
        }

        Ok(SaveResponse { success: reply.status == 200, response: reply.body })
    }

    /// Turn a client geometry into backend WKT
    pub fn encode_geometry(
        field: &GeometryField,
        kind: Option<GeometryKind>,
        projection: &ProjectionSettings,
    ) -> Result<String> {
        let tree = match field {
            GeometryField::Serialized(text) => return Ok(text.clone()),
            GeometryField::Coordinates(tree) => tree.clone(),
            GeometryField::Flattened { points, parts } => {
                let kind = layer_kind(kind)?;
                let shape = match parts {
                    Some(counts) => Shape::from_part_counts(kind, counts)?,
                    None => inferred_shape(kind, points.len())?,
                };
                to_coordinate_tree(points, &shape, ConsumptionOrder::Forward)?
            }
        };
        reproject_tree(&tree, layer_kind(kind)?, projection.client_srs, projection.backend_srs)
    }
}

fn layer_kind(kind: Option<GeometryKind>) -> Result<GeometryKind> {
    kind.ok_or_else(|| NgwError::geometry("layer has no geometry type"))
}

fn geometry_reason(err: NgwError) -> String {
    match err {
        NgwError::Geometry { reason } => reason,
        NgwError::Validation { message, .. } => message,
        other => other.to_string(),
    }
}
