use std::collections::HashSet;

use arcngw_client::IdentifyRequest;
use arcngw_core::error::{NgwError, Result};
use arcngw_core::models::{IdentifyParams, IdentifyQuery, IdentifyResults};
use arcngw_geo::buffer_wkt;
use futures::future::try_join_all;

use crate::state::AppState;

/// Service for MapServer identify queries
pub struct IdentifyQueryBuilder;

impl IdentifyQueryBuilder {
    pub async fn identify(state: &AppState, params: &IdentifyParams) -> Result<IdentifyResults> {
        state.ngw.session.ensure_authenticated().await?;

        let query = IdentifyQuery::parse(params)?;
        let geom = buffer_wkt(&query);
        let layers = Self::resolve_layers(state, &query.style_ids).await?;
        tracing::info!(
            x = query.point.x,
            y = query.point.y,
            tolerance = query.tolerance,
            layers = ?layers,
            "Running identify"
        );

        let request = IdentifyRequest { srs: state.projection.backend_srs, geom, layers };
        let ticket = state.ngw.session.ensure_authenticated().await?;
        let reply = state.ngw.backend.identify(&ticket, &request).await?;
        if !reply.is_success() {
            if reply.is_unauthorized() {
                state.ngw.session.invalidate(&ticket);
            }
            return Err(NgwError::Upstream { status: reply.status });
        }

        IdentifyResults::from_backend(&reply.body)
    }

    /// Map style ids to their parent layer ids.
    ///
    /// Lookups run concurrently; the result keeps first-seen order without
    /// duplicates.
    pub async fn resolve_layers(state: &AppState, style_ids: &[u64]) -> Result<Vec<u64>> {
        let mut seen = HashSet::new();
        let styles: Vec<u64> = style_ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        let descriptors =
            try_join_all(styles.iter().map(|id| state.ngw.directory.describe(*id))).await?;

        let mut seen = HashSet::new();
        let mut layers = Vec::with_capacity(descriptors.len());
        for (style, descriptor) in styles.iter().zip(descriptors) {
            let layer = descriptor.parent_id.ok_or_else(|| NgwError::not_found(style))?;
            if seen.insert(layer) {
                layers.push(layer);
            }
        }
        Ok(layers)
    }
}
