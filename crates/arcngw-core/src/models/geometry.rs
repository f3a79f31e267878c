//! Canonical geometry types shared by the codec, the reprojector and the API.
//!
//! Two encodings meet here: the nested coordinate tree used by GeoJSON-style
//! documents and the flattened point list used by ESRI-style clients.

use serde::{Deserialize, Serialize};

use crate::error::{NgwError, Result};

/// Geometry type tag shared by backend layers and coordinate documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GeometryKind {
    #[default]
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
}

impl GeometryKind {
    /// Nesting depth of the coordinate tree for this type.
    ///
    /// A bare position has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            GeometryKind::Point => 0,
            GeometryKind::MultiPoint | GeometryKind::LineString => 1,
            GeometryKind::Polygon | GeometryKind::MultiLineString => 2,
            GeometryKind::MultiPolygon => 3,
        }
    }

    /// Parse a backend geometry type name such as `POINT` or `MULTILINESTRINGZ`
    pub fn from_backend(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        let base = upper.strip_suffix('Z').unwrap_or(&upper);
        match base {
            "POINT" => Some(GeometryKind::Point),
            "MULTIPOINT" => Some(GeometryKind::MultiPoint),
            "LINESTRING" => Some(GeometryKind::LineString),
            "MULTILINESTRING" => Some(GeometryKind::MultiLineString),
            "POLYGON" => Some(GeometryKind::Polygon),
            "MULTIPOLYGON" => Some(GeometryKind::MultiPolygon),
            _ => None,
        }
    }

    /// GeoJSON `type` member for this geometry
    pub fn geojson_name(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::LineString => "LineString",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
        }
    }
}

/// Nested coordinate arrays, as found in the `coordinates` member of GeoJSON.
///
/// A node is a position once it holds numbers rather than further sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateTree {
    Position(Vec<f64>),
    Nested(Vec<CoordinateTree>),
}

impl CoordinateTree {
    /// Build a position node from x/y
    pub fn position(x: f64, y: f64) -> Self {
        CoordinateTree::Position(vec![x, y])
    }

    /// Wrap the tree into a `{type, coordinates}` document
    pub fn to_document(&self, kind: GeometryKind) -> serde_json::Value {
        serde_json::json!({
            "type": kind.geojson_name(),
            "coordinates": self,
        })
    }
}

/// One point of a flattened geometry, keyed by axis name
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl PointRecord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// Axis values in x, y, z order
    pub fn to_vec(&self) -> Vec<f64> {
        match self.z {
            Some(z) => vec![self.x, self.y, z],
            None => vec![self.x, self.y],
        }
    }
}

/// Nesting skeleton of a coordinate tree with the positions removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Position,
    Parts(Vec<Shape>),
}

impl Shape {
    /// Depth of the skeleton; an empty part list still counts as one level
    pub fn depth(&self) -> usize {
        match self {
            Shape::Position => 0,
            Shape::Parts(parts) => 1 + parts.iter().map(Shape::depth).max().unwrap_or(0),
        }
    }

    /// Number of positions the skeleton expects
    pub fn leaf_count(&self) -> usize {
        match self {
            Shape::Position => 1,
            Shape::Parts(parts) => parts.iter().map(Shape::leaf_count).sum(),
        }
    }

    /// Point counts per innermost part (per ring for polygons, per line for lines).
    ///
    /// A single position has no parts.
    pub fn part_counts(&self) -> Vec<usize> {
        let mut counts = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Shape::Parts(parts) = node {
                if parts.iter().all(|p| matches!(p, Shape::Position)) {
                    counts.push(parts.len());
                } else {
                    stack.extend(parts.iter().rev());
                }
            }
        }
        counts
    }

    /// Rebuild a skeleton from per-part point counts.
    ///
    /// Multi-polygons cannot express ring grouping through flat counts, so
    /// each count becomes a polygon with a single ring.
    pub fn from_part_counts(kind: GeometryKind, counts: &[usize]) -> Result<Self> {
        if counts.contains(&0) {
            return Err(NgwError::geometry("part counts must be positive"));
        }
        let run = |n: usize| Shape::Parts(vec![Shape::Position; n]);
        match kind {
            GeometryKind::Point => match counts {
                [] | [1] => Ok(Shape::Position),
                _ => Err(NgwError::geometry("a point has exactly one position")),
            },
            GeometryKind::MultiPoint | GeometryKind::LineString => match counts {
                [n] => Ok(run(*n)),
                _ => Err(NgwError::geometry(format!(
                    "{} expects a single part, got {}",
                    kind.geojson_name(),
                    counts.len()
                ))),
            },
            GeometryKind::Polygon | GeometryKind::MultiLineString => {
                if counts.is_empty() {
                    return Err(NgwError::geometry(format!(
                        "{} expects at least one part",
                        kind.geojson_name()
                    )));
                }
                Ok(Shape::Parts(counts.iter().map(|n| run(*n)).collect()))
            }
            GeometryKind::MultiPolygon => {
                if counts.is_empty() {
                    return Err(NgwError::geometry("MultiPolygon expects at least one ring"));
                }
                Ok(Shape::Parts(counts.iter().map(|n| Shape::Parts(vec![run(*n)])).collect()))
            }
        }
    }
}

/// ESRI-style geometry: a flat point list plus the skeleton to re-nest it
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedGeometry {
    pub geometry_type: GeometryKind,
    pub points: Vec<PointRecord>,
    pub shape: Shape,
}

/// Order in which a flat point list is consumed when re-nesting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsumptionOrder {
    /// First point fills the first position; exact inverse of flattening
    #[default]
    Forward,
    /// Last point fills the first position (last-in-first-out)
    Reverse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names() {
        assert_eq!(GeometryKind::from_backend("POINT"), Some(GeometryKind::Point));
        assert_eq!(GeometryKind::from_backend("multilinestring"), Some(GeometryKind::MultiLineString));
        assert_eq!(GeometryKind::from_backend("POLYGONZ"), Some(GeometryKind::Polygon));
        assert_eq!(GeometryKind::from_backend("CIRCLE"), None);
    }

    #[test]
    fn test_coordinate_tree_deserialization() {
        let point: CoordinateTree = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(point, CoordinateTree::position(1.0, 2.0));

        let line: CoordinateTree = serde_json::from_str("[[1, 2], [3, 4.5]]").unwrap();
        assert_eq!(
            line,
            CoordinateTree::Nested(vec![
                CoordinateTree::position(1.0, 2.0),
                CoordinateTree::position(3.0, 4.5)
            ])
        );

        assert!(serde_json::from_str::<CoordinateTree>("[1, [2, 3]]").is_err());
    }

    #[test]
    fn test_tree_document() {
        let doc = CoordinateTree::position(30.0, 60.0).to_document(GeometryKind::Point);
        assert_eq!(doc, serde_json::json!({"type": "Point", "coordinates": [30.0, 60.0]}));
    }

    #[test]
    fn test_point_record_serialization_skips_missing_z() {
        let json = serde_json::to_value(PointRecord::new(1.0, 2.0)).unwrap();
        assert_eq!(json, serde_json::json!({"x": 1.0, "y": 2.0}));

        let json = serde_json::to_value(PointRecord::with_z(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(json, serde_json::json!({"x": 1.0, "y": 2.0, "z": 3.0}));
    }

    #[test]
    fn test_shape_from_part_counts() {
        let polygon = Shape::from_part_counts(GeometryKind::Polygon, &[5, 4]).unwrap();
        assert_eq!(polygon.depth(), 2);
        assert_eq!(polygon.leaf_count(), 9);
        assert_eq!(polygon.part_counts(), vec![5, 4]);

        let point = Shape::from_part_counts(GeometryKind::Point, &[]).unwrap();
        assert_eq!(point, Shape::Position);
        assert!(point.part_counts().is_empty());

        let multi = Shape::from_part_counts(GeometryKind::MultiPolygon, &[4, 5]).unwrap();
        assert_eq!(multi.depth(), 3);
        assert_eq!(multi.part_counts(), vec![4, 5]);
    }

    #[test]
    fn test_shape_from_part_counts_rejects_mismatch() {
        assert!(Shape::from_part_counts(GeometryKind::LineString, &[2, 3]).is_err());
        assert!(Shape::from_part_counts(GeometryKind::Point, &[2]).is_err());
        assert!(Shape::from_part_counts(GeometryKind::Polygon, &[]).is_err());
        assert!(Shape::from_part_counts(GeometryKind::Polygon, &[4, 0]).is_err());
    }
}
