//! Conversion between nested coordinate trees and flattened point lists.
//!
//! Both directions walk the tree with an explicit stack, so nesting depth is
//! bounded only by memory.

use std::slice;

use arcngw_core::error::{NgwError, Result};
use arcngw_core::models::{
    ConsumptionOrder, CoordinateTree, FlattenedGeometry, GeometryKind, PointRecord, Shape,
};

struct FlattenFrame<'a> {
    children: slice::Iter<'a, CoordinateTree>,
    parts: Vec<Shape>,
}

/// Flatten a coordinate tree into a point list plus its shape.
///
/// Every position must sit at the depth implied by `expected`.
pub fn to_flattened(tree: &CoordinateTree, expected: GeometryKind) -> Result<FlattenedGeometry> {
    let mut points = Vec::new();

    let shape = match tree {
        CoordinateTree::Position(values) => {
            points.push(point_record(values)?);
            Shape::Position
        }
        CoordinateTree::Nested(children) => {
            if children.is_empty() {
                return Err(NgwError::geometry("empty coordinate sequence"));
            }
            let mut frames = vec![FlattenFrame { children: children.iter(), parts: Vec::new() }];
            let mut root = None;

            while let Some(frame) = frames.last_mut() {
                match frame.children.next() {
                    Some(CoordinateTree::Position(values)) => {
                        let depth = frames.len();
                        if depth != expected.depth() {
                            return Err(depth_mismatch(expected, depth));
                        }
                        points.push(point_record(values)?);
                        if let Some(frame) = frames.last_mut() {
                            frame.parts.push(Shape::Position);
                        }
                    }
                    Some(CoordinateTree::Nested(grandchildren)) => {
                        if grandchildren.is_empty() {
                            return Err(NgwError::geometry("empty coordinate sequence"));
                        }
                        frames.push(FlattenFrame {
                            children: grandchildren.iter(),
                            parts: Vec::new(),
                        });
                    }
                    None => {
                        if let Some(finished) = frames.pop() {
                            let part = Shape::Parts(finished.parts);
                            match frames.last_mut() {
                                Some(parent) => parent.parts.push(part),
                                None => root = Some(part),
                            }
                        }
                    }
                }
            }

            root.unwrap_or(Shape::Parts(Vec::new()))
        }
    };

    if shape.depth() != expected.depth() {
        return Err(depth_mismatch(expected, shape.depth()));
    }

    Ok(FlattenedGeometry { geometry_type: expected, points, shape })
}

fn point_record(values: &[f64]) -> Result<PointRecord> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(NgwError::geometry("coordinates must be finite"));
    }
    match *values {
        [x, y] => Ok(PointRecord::new(x, y)),
        [x, y, z] => Ok(PointRecord::with_z(x, y, z)),
        _ => Err(NgwError::geometry(format!(
            "a position needs 2 or 3 numbers, got {}",
            values.len()
        ))),
    }
}

fn depth_mismatch(expected: GeometryKind, depth: usize) -> NgwError {
    NgwError::geometry(format!(
        "{} coordinates must be nested {} level(s) deep, found {}",
        expected.geojson_name(),
        expected.depth(),
        depth
    ))
}

/// Reads points through an explicit cursor in the requested order
struct PointCursor<'a> {
    points: &'a [PointRecord],
    consumed: usize,
    order: ConsumptionOrder,
}

impl PointCursor<'_> {
    fn take(&mut self) -> Option<&PointRecord> {
        let index = match self.order {
            ConsumptionOrder::Forward => self.consumed,
            ConsumptionOrder::Reverse => self.points.len().checked_sub(self.consumed + 1)?,
        };
        let point = self.points.get(index)?;
        self.consumed += 1;
        Some(point)
    }
}

struct BuildFrame<'a> {
    parts: slice::Iter<'a, Shape>,
    nodes: Vec<CoordinateTree>,
}

/// Rebuild a coordinate tree from a point list and a shape.
///
/// The point count must match the shape exactly.
pub fn to_coordinate_tree(
    points: &[PointRecord],
    shape: &Shape,
    order: ConsumptionOrder,
) -> Result<CoordinateTree> {
    if points.len() != shape.leaf_count() {
        return Err(NgwError::geometry(format!(
            "shape expects {} point(s), got {}",
            shape.leaf_count(),
            points.len()
        )));
    }

    let mut cursor = PointCursor { points, consumed: 0, order };
    let mut next_position = || {
        cursor
            .take()
            .map(|p| CoordinateTree::Position(p.to_vec()))
            .ok_or_else(|| NgwError::geometry("point list exhausted"))
    };

    let parts = match shape {
        Shape::Position => return next_position(),
        Shape::Parts(parts) => parts,
    };

    let mut frames = vec![BuildFrame { parts: parts.iter(), nodes: Vec::new() }];
    while let Some(frame) = frames.last_mut() {
        match frame.parts.next() {
            Some(Shape::Position) => {
                let position = next_position()?;
                if let Some(frame) = frames.last_mut() {
                    frame.nodes.push(position);
                }
            }
            Some(Shape::Parts(children)) => {
                frames.push(BuildFrame { parts: children.iter(), nodes: Vec::new() });
            }
            None => {
                if let Some(finished) = frames.pop() {
                    let node = CoordinateTree::Nested(finished.nodes);
                    match frames.last_mut() {
                        Some(parent) => parent.nodes.push(node),
                        None => return Ok(node),
                    }
                }
            }
        }
    }

    Ok(CoordinateTree::Nested(Vec::new()))
}

/// Default shape for a flat point list when the caller gave no part counts.
///
/// Every point goes into one part: one line, one ring, or one polygon with a
/// single ring.
pub fn inferred_shape(kind: GeometryKind, point_count: usize) -> Result<Shape> {
    Shape::from_part_counts(kind, &[point_count])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(json: &str) -> CoordinateTree {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_flatten_point() {
        let flat = to_flattened(&tree("[30, 60]"), GeometryKind::Point).unwrap();
        assert_eq!(flat.points, vec![PointRecord::new(30.0, 60.0)]);
        assert_eq!(flat.shape, Shape::Position);
    }

    #[test]
    fn test_flatten_polygon_records_ring_counts() {
        let polygon = tree(
            "[[[0,0],[4,0],[4,4],[0,4],[0,0]], [[1,1],[2,1],[2,2],[1,1]]]",
        );
        let flat = to_flattened(&polygon, GeometryKind::Polygon).unwrap();
        assert_eq!(flat.points.len(), 9);
        assert_eq!(flat.shape.part_counts(), vec![5, 4]);
        assert_eq!(flat.points[5], PointRecord::new(1.0, 1.0));
        assert_eq!(flat.geometry_type, GeometryKind::Polygon);
    }

    #[test]
    fn test_flatten_keeps_z() {
        let flat = to_flattened(&tree("[[1,2,3],[4,5,6]]"), GeometryKind::LineString).unwrap();
        assert_eq!(flat.points[1], PointRecord::with_z(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_flatten_rejects_wrong_depth() {
        let line = tree("[[1,2],[3,4]]");
        assert!(matches!(
            to_flattened(&line, GeometryKind::Polygon),
            Err(NgwError::Geometry { .. })
        ));
        assert!(to_flattened(&line, GeometryKind::Point).is_err());

        let ragged = tree("[[1,2],[[3,4]]]");
        assert!(to_flattened(&ragged, GeometryKind::LineString).is_err());
    }

    #[test]
    fn test_flatten_rejects_bad_positions() {
        assert!(to_flattened(&tree("[1]"), GeometryKind::Point).is_err());
        assert!(to_flattened(&tree("[1,2,3,4]"), GeometryKind::Point).is_err());
        assert!(to_flattened(&tree("[]"), GeometryKind::Point).is_err());
        assert!(to_flattened(&tree("[[]]"), GeometryKind::MultiPoint).is_err());
    }

    #[test]
    fn test_rebuild_forward_is_inverse() {
        let polygon = tree("[[[0,0],[4,0],[4,4],[0,0]]]");
        let flat = to_flattened(&polygon, GeometryKind::Polygon).unwrap();
        let rebuilt =
            to_coordinate_tree(&flat.points, &flat.shape, ConsumptionOrder::Forward).unwrap();
        assert_eq!(rebuilt, polygon);
    }

    #[test]
    fn test_rebuild_reverse_consumes_from_the_end() {
        let line = tree("[[1,1],[2,2],[3,3]]");
        let flat = to_flattened(&line, GeometryKind::LineString).unwrap();
        let rebuilt =
            to_coordinate_tree(&flat.points, &flat.shape, ConsumptionOrder::Reverse).unwrap();
        assert_eq!(rebuilt, tree("[[3,3],[2,2],[1,1]]"));
    }

    #[test]
    fn test_single_point_is_order_independent() {
        let points = [PointRecord::new(5.0, 6.0)];
        for order in [ConsumptionOrder::Forward, ConsumptionOrder::Reverse] {
            let rebuilt = to_coordinate_tree(&points, &Shape::Position, order).unwrap();
            assert_eq!(rebuilt, CoordinateTree::position(5.0, 6.0));
        }
    }

    #[test]
    fn test_rebuild_rejects_count_mismatch() {
        let shape = Shape::from_part_counts(GeometryKind::LineString, &[3]).unwrap();
        let points = [PointRecord::new(0.0, 0.0), PointRecord::new(1.0, 1.0)];
        assert!(matches!(
            to_coordinate_tree(&points, &shape, ConsumptionOrder::Forward),
            Err(NgwError::Geometry { .. })
        ));
    }

    #[test]
    fn test_rebuild_with_explicit_counts() {
        let points: Vec<_> = (0..7).map(|i| PointRecord::new(i as f64, 0.0)).collect();
        let shape = Shape::from_part_counts(GeometryKind::MultiLineString, &[3, 4]).unwrap();
        let rebuilt = to_coordinate_tree(&points, &shape, ConsumptionOrder::Forward).unwrap();
        assert_eq!(rebuilt, tree("[[[0,0],[1,0],[2,0]],[[3,0],[4,0],[5,0],[6,0]]]"));
    }
}
