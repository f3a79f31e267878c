//! Tolerance buffer around an identify point.
//!
//! The client tolerance is given in screen pixels; it is converted to map
//! units per axis from the visible extent and the image size.

use arcngw_core::models::IdentifyQuery;
use geo::{Coord, LineString, Polygon};
use wkt::ToWkt;

/// Per-axis half extents of the buffer, in map units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceBuffer {
    pub half_width: f64,
    pub half_height: f64,
}

impl ToleranceBuffer {
    /// Map units covered by `tolerance` pixels along each axis
    pub fn for_query(query: &IdentifyQuery) -> Self {
        Self {
            half_width: query.extent.width() / query.display.width * query.tolerance,
            half_height: query.extent.height() / query.display.height * query.tolerance,
        }
    }

    /// Closed five-vertex ring around (x, y), starting at the lower-left corner
    pub fn ring(&self, x: f64, y: f64) -> LineString<f64> {
        let (w, h) = (self.half_width, self.half_height);
        LineString::new(vec![
            Coord { x: x - w, y: y - h },
            Coord { x: x - w, y: y + h },
            Coord { x: x + w, y: y + h },
            Coord { x: x + w, y: y - h },
            Coord { x: x - w, y: y - h },
        ])
    }
}

/// Buffer polygon for an identify query
pub fn buffer_polygon(query: &IdentifyQuery) -> Polygon<f64> {
    let ring = ToleranceBuffer::for_query(query).ring(query.point.x, query.point.y);
    Polygon::new(ring, Vec::new())
}

/// Buffer polygon serialized as WKT
pub fn buffer_wkt(query: &IdentifyQuery) -> String {
    buffer_polygon(query).wkt_string()
}
