use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Largest accepted `/save` body
pub const SAVE_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Create the MapServer facade router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health_check))

        // Feature editing
        .route("/save", post(handlers::save_feature).layer(DefaultBodyLimit::max(SAVE_BODY_LIMIT)))

        // MapServer
        .route("/{map}/MapServer", get(handlers::map_capabilities))
        .route("/{map}/MapServer/export", get(handlers::export_image))
        .route("/{map}/MapServer/layers", get(handlers::map_layers))
        .route("/{map}/MapServer/identify", get(handlers::identify))
        .route("/{map}/MapServer/{id_layer}", get(handlers::layer_info))

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
