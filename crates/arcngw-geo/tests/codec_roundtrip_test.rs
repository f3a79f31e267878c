//! Property tests for the geometry codec
//!
//! Flattening a tree and rebuilding it from the recorded shape must give the
//! starting tree back, whatever the nesting.

use arcngw_core::models::{ConsumptionOrder, CoordinateTree, GeometryKind};
use arcngw_geo::codec::{to_coordinate_tree, to_flattened};
use proptest::prelude::*;

fn position() -> impl Strategy<Value = CoordinateTree> {
    prop_oneof![
        (-1000i32..1000, -1000i32..1000)
            .prop_map(|(x, y)| CoordinateTree::Position(vec![x as f64, y as f64])),
        (-180.0f64..180.0, -90.0f64..90.0, -100.0f64..100.0)
            .prop_map(|(x, y, z)| CoordinateTree::Position(vec![x, y, z])),
    ]
}

fn level(inner: impl Strategy<Value = CoordinateTree>) -> impl Strategy<Value = CoordinateTree> {
    prop::collection::vec(inner, 1..6).prop_map(CoordinateTree::Nested)
}

fn tree_with_kind() -> impl Strategy<Value = (CoordinateTree, GeometryKind)> {
    prop_oneof![
        position().prop_map(|t| (t, GeometryKind::Point)),
        level(position()).prop_map(|t| (t, GeometryKind::LineString)),
        level(level(position())).prop_map(|t| (t, GeometryKind::Polygon)),
        level(level(level(position()))).prop_map(|t| (t, GeometryKind::MultiPolygon)),
    ]
}

fn leaves(tree: &CoordinateTree) -> Vec<Vec<f64>> {
    match tree {
        CoordinateTree::Position(values) => vec![values.clone()],
        CoordinateTree::Nested(children) => children.iter().flat_map(leaves).collect(),
    }
}

proptest! {
    #[test]
    fn prop_forward_roundtrip_restores_tree((tree, kind) in tree_with_kind()) {
        let flat = to_flattened(&tree, kind).unwrap();
        prop_assert_eq!(flat.points.len(), flat.shape.leaf_count());

        let rebuilt = to_coordinate_tree(&flat.points, &flat.shape, ConsumptionOrder::Forward).unwrap();
        prop_assert_eq!(rebuilt, tree);
    }

    #[test]
    fn prop_reverse_order_reverses_leaves((tree, kind) in tree_with_kind()) {
        let flat = to_flattened(&tree, kind).unwrap();
        let rebuilt = to_coordinate_tree(&flat.points, &flat.shape, ConsumptionOrder::Reverse).unwrap();

        let mut expected = leaves(&tree);
        expected.reverse();
        prop_assert_eq!(leaves(&rebuilt), expected);
    }

    #[test]
    fn prop_wrong_kind_is_rejected((tree, kind) in tree_with_kind()) {
        let other = match kind {
            GeometryKind::Point => GeometryKind::LineString,
            _ => GeometryKind::Point,
        };
        prop_assert!(to_flattened(&tree, other).is_err());
    }
}
