//! Identify query parameters and result documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{NgwError, Result};

/// Raw identify parameters as they arrive on the query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyParams {
    pub map_extent: Option<String>,
    pub image_display: Option<String>,
    pub tolerance: Option<String>,
    pub geometry: Option<String>,
    pub layers: Option<String>,
}

/// Visible map extent in backend units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapExtent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl MapExtent {
    pub fn width(&self) -> f64 {
        (self.xmax - self.xmin).abs()
    }

    pub fn height(&self) -> f64 {
        (self.ymax - self.ymin).abs()
    }
}

/// Size of the client map image in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageDisplay {
    pub width: f64,
    pub height: f64,
    pub dpi: f64,
}

/// Clicked map location
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct QueryPoint {
    pub x: f64,
    pub y: f64,
}

/// Validated identify request
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifyQuery {
    pub extent: MapExtent,
    pub display: ImageDisplay,
    pub tolerance: f64,
    pub point: QueryPoint,
    pub style_ids: Vec<u64>,
}

pub const DEFAULT_TOLERANCE: f64 = 3.0;

impl IdentifyQuery {
    /// Validate raw parameters; any violation is a validation error
    pub fn parse(params: &IdentifyParams) -> Result<Self> {
        let extent = parse_numbers(params.map_extent.as_deref(), 4, "mapExtent")?;
        let display = parse_numbers(params.image_display.as_deref(), 3, "imageDisplay")?;
        if display[0] <= 0.0 || display[1] <= 0.0 {
            return Err(NgwError::validation("imageDisplay width and height must be positive"));
        }

        let tolerance = match params.tolerance.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_TOLERANCE,
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|t| t.is_finite() && *t > 0.0)
                .ok_or_else(|| NgwError::validation(format!("Invalid tolerance '{}'", raw)))?,
        };

        let point = parse_point(params.geometry.as_deref())?;
        let style_ids = parse_layer_selection(params.layers.as_deref().unwrap_or(""))?;

        Ok(Self {
            extent: MapExtent { xmin: extent[0], ymin: extent[1], xmax: extent[2], ymax: extent[3] },
            display: ImageDisplay { width: display[0], height: display[1], dpi: display[2] },
            tolerance,
            point,
            style_ids,
        })
    }
}

fn parse_numbers(raw: Option<&str>, expected: usize, name: &str) -> Result<Vec<f64>> {
    let raw = raw.ok_or_else(|| NgwError::validation(format!("Missing {}", name)))?;
    let values: Vec<f64> = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| NgwError::validation(format!("Invalid {} '{}'", name, raw)))?;
    if values.len() != expected || values.iter().any(|v| !v.is_finite()) {
        return Err(NgwError::validation(format!(
            "{} must contain {} numbers, got '{}'",
            name, expected, raw
        )));
    }
    Ok(values)
}

/// Accepts `{"x": .., "y": ..}` JSON or the simple `x,y` syntax
fn parse_point(raw: Option<&str>) -> Result<QueryPoint> {
    let raw = raw.map(str::trim).ok_or_else(|| NgwError::validation("Missing geometry"))?;
    let invalid = || NgwError::validation(format!("Invalid point geometry '{}'", raw));

    let point = if raw.starts_with('{') {
        serde_json::from_str::<QueryPoint>(raw).map_err(|_| invalid())?
    } else {
        let (x, y) = raw.split_once(',').ok_or_else(invalid)?;
        QueryPoint {
            x: x.trim().parse().map_err(|_| invalid())?,
            y: y.trim().parse().map_err(|_| invalid())?,
        }
    };
    if !point.x.is_finite() || !point.y.is_finite() {
        return Err(invalid());
    }
    Ok(point)
}

/// Parse an ArcGIS `layers` selection such as `visible:3,4` into style ids
pub fn parse_layer_selection(raw: &str) -> Result<Vec<u64>> {
    let invalid = || NgwError::validation(format!("Invalid layers parameter '{}'", raw));
    let (option, ids) = raw.trim().split_once(':').ok_or_else(invalid)?;
    if option.is_empty() || !option.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(invalid());
    }
    let ids: Vec<u64> = ids
        .split(',')
        .map(|id| id.trim().parse::<u64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| invalid())?;
    if ids.is_empty() {
        return Err(invalid());
    }
    Ok(ids)
}

/// One identified feature in ArcGIS shape
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyResult {
    pub attributes: Map<String, Value>,
    pub layer_id: Value,
    pub display_field_name: String,
    pub value: Value,
}

/// Body of an identify response
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IdentifyResults {
    pub results: Vec<IdentifyResult>,
}

impl IdentifyResults {
    /// Reshape a backend identify document keyed by layer id.
    ///
    /// Keys that are not layer ids (such as `featureCount`) are skipped.
    pub fn from_backend(body: &Value) -> Result<Self> {
        let object = body.as_object().ok_or_else(|| NgwError::MalformedReply {
            reason: "identify response is not a JSON object".to_string(),
        })?;
        let mut results = Vec::new();

        for (key, collection) in object {
            if key.is_empty() || !key.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            let features = collection.get("features").and_then(Value::as_array);
            for feature in features.into_iter().flatten() {
                let id = feature.get("id").cloned().unwrap_or(Value::Null);
                let mut attributes = feature
                    .get("fields")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();
                attributes.insert("id".to_string(), id.clone());
                results.push(IdentifyResult {
                    attributes,
                    layer_id: feature.get("layerId").cloned().unwrap_or(Value::Null),
                    display_field_name: "id".to_string(),
                    value: id,
                });
            }
        }

        Ok(Self { results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params() -> IdentifyParams {
        IdentifyParams {
            map_extent: Some("0,0,100,100".to_string()),
            image_display: Some("100,100,96".to_string()),
            tolerance: None,
            geometry: Some(r#"{"x":50,"y":50}"#.to_string()),
            layers: Some("all:4,5".to_string()),
        }
    }

    #[test]
    fn test_parse_defaults_tolerance() {
        let query = IdentifyQuery::parse(&params()).unwrap();
        assert_eq!(query.tolerance, 3.0);
        assert_eq!(query.point, QueryPoint { x: 50.0, y: 50.0 });
        assert_eq!(query.style_ids, vec![4, 5]);
        assert_eq!(query.extent.width(), 100.0);
    }

    #[test]
    fn test_parse_simple_point_syntax() {
        let mut p = params();
        p.geometry = Some("12.5, -3".to_string());
        let query = IdentifyQuery::parse(&p).unwrap();
        assert_eq!(query.point, QueryPoint { x: 12.5, y: -3.0 });
    }

    #[test]
    fn test_parse_rejects_bad_parameters() {
        let cases: Vec<Box<dyn Fn(&mut IdentifyParams)>> = vec![
            Box::new(|p| p.map_extent = Some("0,0,100".to_string())),
            Box::new(|p| p.image_display = Some("100,100".to_string())),
            Box::new(|p| p.image_display = Some("0,100,96".to_string())),
            Box::new(|p| p.tolerance = Some("abc".to_string())),
            Box::new(|p| p.geometry = None),
            Box::new(|p| p.geometry = Some(r#"{"x":"a","y":1}"#.to_string())),
            Box::new(|p| p.layers = Some("4,5".to_string())),
            Box::new(|p| p.layers = Some("all:".to_string())),
        ];
        for mutate in cases {
            let mut p = params();
            mutate(&mut p);
            assert!(matches!(IdentifyQuery::parse(&p), Err(NgwError::Validation { .. })));
        }
    }

    #[test]
    fn test_layer_selection() {
        assert_eq!(parse_layer_selection("show:1,2,3").unwrap(), vec![1, 2, 3]);
        assert!(parse_layer_selection("show:1,,3").is_err());
        assert!(parse_layer_selection(":1").is_err());
    }

    #[test]
    fn test_reshape_skips_non_numeric_keys() {
        let body = json!({
            "7": {"features": [{"id": 1, "layerId": 7, "fields": {"name": "a"}}]},
            "ok": true
        });
        let results = IdentifyResults::from_backend(&body).unwrap();
        assert_eq!(
            serde_json::to_value(&results).unwrap(),
            json!({"results": [{
                "attributes": {"name": "a", "id": 1},
                "layerId": 7,
                "displayFieldName": "id",
                "value": 1
            }]})
        );
    }

    #[test]
    fn test_reshape_keeps_encounter_order() {
        let body = json!({
            "9": {"features": [{"id": 3, "layerId": 9, "fields": {}}]},
            "featureCount": 2,
            "2": {"features": [{"id": 8, "layerId": 2, "fields": {}}]}
        });
        let results = IdentifyResults::from_backend(&body).unwrap();
        let ids: Vec<_> = results.results.iter().map(|r| r.value.clone()).collect();
        assert_eq!(ids, vec![json!(3), json!(8)]);
    }

    #[test]
    fn test_reshape_rejects_non_object_reply() {
        let err = IdentifyResults::from_backend(&json!("<html>oops</html>")).unwrap_err();
        assert!(matches!(err, NgwError::MalformedReply { .. }));
        assert!(err.to_string().starts_with("Malformed backend response"));
    }
}
