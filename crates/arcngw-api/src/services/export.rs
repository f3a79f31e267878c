use arcngw_client::RenderRequest;
use arcngw_core::error::{NgwError, Result};
use arcngw_core::models::parse_layer_selection;

use crate::dto::ExportParams;
use crate::state::AppState;

/// Forwards MapServer export calls to the backend renderer
pub struct ExportProxy;

impl ExportProxy {
    /// Render the requested styles and return the image bytes
    pub async fn export(state: &AppState, params: &ExportParams) -> Result<Vec<u8>> {
        state.ngw.session.ensure_authenticated().await?;

        let styles = parse_layer_selection(params.layers.as_deref().unwrap_or(""))?;
        let request = RenderRequest {
            extent: required(params.bbox.as_deref(), "bbox")?,
            size: required(params.size.as_deref(), "size")?,
            resource: styles.iter().map(u64::to_string).collect::<Vec<_>>().join(","),
        };
        tracing::debug!(extent = %request.extent, size = %request.size, resource = %request.resource, "Rendering image");

        let ticket = state.ngw.session.ensure_authenticated().await?;
        let reply = state.ngw.backend.render_image(&ticket, &request).await?;
        if !(200..300).contains(&reply.status) {
            if matches!(reply.status, 401 | 403) {
                state.ngw.session.invalidate(&ticket);
            }
            return Err(NgwError::Upstream { status: reply.status });
        }

        Ok(reply.bytes)
    }
}

fn required(value: Option<&str>, name: &str) -> Result<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| NgwError::validation(format!("Missing {}", name)))
}
