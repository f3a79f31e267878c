use std::sync::Arc;

use anyhow::Context;
use arcngw_core::config::GatewayConfig;
use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arcngw_api::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arcngw_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::load().context("Failed to load configuration")?;

    tracing::info!(
        port = config.port,
        ngw_host = %config.ngw.host,
        map_wkid = config.map_wkid,
        client_srs = config.client_srs,
        backend_srs = config.ngw.srs,
        "Starting arcngw API server"
    );

    let state = Arc::new(AppState::from_config(&config).context("Failed to create backend client")?);
    let app = create_router(state).layer(cors_layer(&config.cors_origin)?);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("CORS enabled for {}", config.cors_origin);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if origin == "*" {
        return Ok(cors.allow_origin(Any));
    }
    let origin = origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid ARCNGW_CORS_ORIGIN '{}'", origin))?;
    Ok(cors.allow_origin(origin))
}
