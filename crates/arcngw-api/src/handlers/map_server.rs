use std::sync::Arc;

use arcngw_core::models::{IdentifyParams, IdentifyResults};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::dto::{parse_numeric_segment, CallbackQuery, ExportParams, LayerPath, MapPath};
use crate::error::ApiError;
use crate::jsonp::{Callback, Jsonp};
use crate::services::{ExportProxy, IdentifyQueryBuilder, MapDescriptorBuilder, MapDocument};
use crate::state::AppState;

/// Frame a service outcome for the (optional) JSONP caller
fn respond<T: serde::Serialize>(
    callback: Option<Callback>,
    outcome: arcngw_core::Result<T>,
) -> Result<Jsonp<T>, ApiError> {
    match outcome {
        Ok(body) => Ok(Jsonp::new(callback, body)),
        Err(e) => Err(ApiError::from(e).with_callback(callback.as_ref())),
    }
}

pub async fn map_capabilities(
    State(state): State<Arc<AppState>>,
    Path(path): Path<MapPath>,
    Query(query): Query<CallbackQuery>,
) -> Result<Jsonp<MapDocument>, ApiError> {
    let callback = Callback::parse(query.callback.as_deref())?;
    let outcome = async {
        let map_id = parse_numeric_segment("map", &path.map)?;
        MapDescriptorBuilder::describe_map(&state, map_id, true).await
    }
    .await;
    respond(callback, outcome)
}

pub async fn map_layers(
    State(state): State<Arc<AppState>>,
    Path(path): Path<MapPath>,
    Query(query): Query<CallbackQuery>,
) -> Result<Jsonp<MapDocument>, ApiError> {
    let callback = Callback::parse(query.callback.as_deref())?;
    let outcome = async {
        let map_id = parse_numeric_segment("map", &path.map)?;
        MapDescriptorBuilder::describe_map(&state, map_id, false).await
    }
    .await;
    respond(callback, outcome)
}

/// Per-layer stub: `callback()` or an empty body
pub async fn layer_info(
    Path(path): Path<LayerPath>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, ApiError> {
    let callback = Callback::parse(query.callback.as_deref())?;
    let validated = parse_numeric_segment("map", &path.map)
        .and_then(|_| parse_numeric_segment("id_layer", &path.id_layer));
    if let Err(e) = validated {
        return Err(ApiError::from(e).with_callback(callback.as_ref()));
    }

    Ok(match callback {
        Some(callback) => callback.respond(StatusCode::OK, ""),
        None => StatusCode::OK.into_response(),
    })
}

pub async fn identify(
    State(state): State<Arc<AppState>>,
    Path(path): Path<MapPath>,
    Query(params): Query<IdentifyParams>,
    Query(query): Query<CallbackQuery>,
) -> Result<Jsonp<IdentifyResults>, ApiError> {
    let callback = Callback::parse(query.callback.as_deref())?;
    let outcome = async {
        parse_numeric_segment("map", &path.map)?;
        IdentifyQueryBuilder::identify(&state, &params).await
    }
    .await;
    respond(callback, outcome)
}

pub async fn export_image(
    State(state): State<Arc<AppState>>,
    Path(path): Path<MapPath>,
    Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
    parse_numeric_segment("map", &path.map)?;
    let bytes = ExportProxy::export(&state, &params).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response())
}
