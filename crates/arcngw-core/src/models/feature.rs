//! Feature create/update requests and the payload sent to the backend.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{NgwError, Result};
use crate::models::geometry::{CoordinateTree, PointRecord};

/// Documentation pointer attached to every geometry rejection
pub const GEOMETRY_DOC_HINT: &str = "Please read http://gis-lab.info/docs/geojson_ru.html#2.1.5";

/// Keys of a save request that never end up in `fields`
const RESERVED_KEYS: [&str; 3] = ["layer", "id", "geometry"];

/// Geometry as supplied by the client
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryField {
    /// Already serialized (WKT); forwarded untouched
    Serialized(String),
    /// Nested coordinates in the client SRS
    Coordinates(CoordinateTree),
    /// Flat point list with optional per-part counts
    Flattened { points: Vec<PointRecord>, parts: Option<Vec<usize>> },
}

impl GeometryField {
    fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(GeometryField::Serialized(text)),
            Value::Array(_) => serde_json::from_value(value)
                .map(GeometryField::Coordinates)
                .map_err(|e| invalid_geometry(e.to_string())),
            Value::Object(mut object) => {
                let points = object
                    .remove("geometries")
                    .or_else(|| object.remove("points"))
                    .ok_or_else(|| invalid_geometry("expected a 'geometries' point list"))?;
                let points: Vec<PointRecord> =
                    serde_json::from_value(points).map_err(|e| invalid_geometry(e.to_string()))?;
                let parts = match object.remove("parts") {
                    None | Some(Value::Null) => None,
                    Some(parts) => Some(
                        serde_json::from_value(parts)
                            .map_err(|e| invalid_geometry(e.to_string()))?,
                    ),
                };
                Ok(GeometryField::Flattened { points, parts })
            }
            other => Err(invalid_geometry(format!("unsupported geometry value {}", other))),
        }
    }
}

/// Build the validation error reported for any unusable geometry
pub fn invalid_geometry(reason: impl std::fmt::Display) -> NgwError {
    NgwError::validation(format!("Invalid geometry field. Exception: {}", reason))
        .with_hint(GEOMETRY_DOC_HINT)
}

/// New feature on a layer
#[derive(Debug, Clone, PartialEq)]
pub struct CreateFeatureRequest {
    pub layer: u64,
    pub geometry: GeometryField,
    pub caption: Option<Value>,
    pub attributes: Map<String, Value>,
}

/// Changes to an existing feature
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateFeatureRequest {
    pub layer: u64,
    pub id: u64,
    pub geometry: Option<GeometryField>,
    pub caption: Option<Value>,
    pub attributes: Map<String, Value>,
}

/// Validated body of `POST /save`
#[derive(Debug, Clone, PartialEq)]
pub enum SaveRequest {
    Create(CreateFeatureRequest),
    Update(UpdateFeatureRequest),
}

impl SaveRequest {
    /// Validate a raw request body.
    ///
    /// A body must be an object with `layer` and at least one of `id` or
    /// `geometry`; `null` counts as absent.
    pub fn from_json(body: Value) -> Result<Self> {
        let Value::Object(mut object) = body else {
            return Err(invalid_body());
        };
        let present = |object: &Map<String, Value>, key: &str| {
            object.get(key).is_some_and(|v| !v.is_null())
        };
        if !present(&object, "layer") || !(present(&object, "id") || present(&object, "geometry")) {
            return Err(invalid_body());
        }

        let layer = take_identifier(&mut object, "layer")?.ok_or_else(invalid_body)?;
        let id = take_identifier(&mut object, "id")?;
        let geometry = match object.remove("geometry") {
            None | Some(Value::Null) => None,
            Some(value) => Some(GeometryField::from_json(value)?),
        };
        // A null caption stays with the other keys and is sent as is
        let caption = if present(&object, "caption") { object.remove("caption") } else { None };
        for key in RESERVED_KEYS {
            object.remove(key);
        }

        Ok(match (id, geometry) {
            (Some(id), geometry) => SaveRequest::Update(UpdateFeatureRequest {
                layer,
                id,
                geometry,
                caption,
                attributes: object,
            }),
            (None, Some(geometry)) => SaveRequest::Create(CreateFeatureRequest {
                layer,
                geometry,
                caption,
                attributes: object,
            }),
            (None, None) => return Err(invalid_body()),
        })
    }

    pub fn layer(&self) -> u64 {
        match self {
            SaveRequest::Create(r) => r.layer,
            SaveRequest::Update(r) => r.layer,
        }
    }

    pub fn geometry(&self) -> Option<&GeometryField> {
        match self {
            SaveRequest::Create(r) => Some(&r.geometry),
            SaveRequest::Update(r) => r.geometry.as_ref(),
        }
    }

    /// Where the payload goes: update when a feature id was given
    pub fn target(&self) -> FeatureTarget {
        match self {
            SaveRequest::Create(r) => FeatureTarget { layer: r.layer, feature_id: None },
            SaveRequest::Update(r) => FeatureTarget { layer: r.layer, feature_id: Some(r.id) },
        }
    }

    /// Build the payload fields: caption first, then every remaining key verbatim
    pub fn into_fields(self) -> Map<String, Value> {
        let (caption, attributes) = match self {
            SaveRequest::Create(r) => (r.caption, r.attributes),
            SaveRequest::Update(r) => (r.caption, r.attributes),
        };
        let mut fields = Map::new();
        if let Some(caption) = caption {
            fields.insert("caption".to_string(), caption);
        }
        for (key, value) in attributes {
            fields.insert(key, value);
        }
        fields
    }
}

fn invalid_body() -> NgwError {
    NgwError::validation("Invalid request body").with_hint("Expected dict")
}

fn take_identifier(object: &mut Map<String, Value>, key: &str) -> Result<Option<u64>> {
    match object.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| NgwError::validation(format!("'{}' must be a non-negative integer", key))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| NgwError::validation(format!("'{}' must be a non-negative integer", key))),
        Some(_) => Err(NgwError::validation(format!("'{}' must be a non-negative integer", key))),
    }
}

/// Backend endpoint selector for a save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureTarget {
    pub layer: u64,
    pub feature_id: Option<u64>,
}

/// Fixed extension slots of a backend feature
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureExtensions {
    pub attachment: Option<Value>,
    pub description: Option<Value>,
}

/// Body of a backend feature create/update call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeaturePayload {
    pub extensions: FeatureExtensions,
    pub fields: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geom: Option<String>,
}
