use arcngw_core::error::{NgwError, Result};
use serde::Deserialize;

/// `/{map}/MapServer` path segment
#[derive(Debug, Deserialize)]
pub struct MapPath {
    pub map: String,
}

/// `/{map}/MapServer/{id_layer}` path segments
#[derive(Debug, Deserialize)]
pub struct LayerPath {
    pub map: String,
    pub id_layer: String,
}

/// Optional JSONP callback on the query string
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub callback: Option<String>,
}

/// Export query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    pub bbox: Option<String>,
    pub size: Option<String>,
    pub layers: Option<String>,
}

/// Path ids are plain decimal numbers
pub fn parse_numeric_segment(name: &str, raw: &str) -> Result<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NgwError::validation(format!("'{}' must be numeric, got '{}'", name, raw)));
    }
    raw.parse()
        .map_err(|_| NgwError::validation(format!("'{}' is out of range: '{}'", name, raw)))
}
