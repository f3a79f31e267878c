//! Integration tests for reprojection between EPSG codes

use arcngw_core::NgwError;
use arcngw_geo::transform::{reproject, GeometryInput, GeometryOutput, OutputFormat};
use serde_json::{json, Value};

fn document(output: GeometryOutput) -> Value {
    match output {
        GeometryOutput::Document(doc) => doc,
        GeometryOutput::Wkt(wkt) => panic!("Expected document, got {}", wkt),
    }
}

fn coordinates(doc: &Value) -> Vec<f64> {
    doc["coordinates"].as_array().unwrap().iter().map(|v| v.as_f64().unwrap()).collect()
}

#[test]
fn test_point_roundtrip_between_wgs84_and_web_mercator() {
    for (lon, lat) in [(37.6173, 55.7558), (-122.4194, 37.7749), (115.0, -8.5), (0.0, 0.0)] {
        let source = json!({"type": "Point", "coordinates": [lon, lat]});

        let forward = document(
            reproject(GeometryInput::Document(&source), 4326, 3857, OutputFormat::CoordinateDocument)
                .unwrap(),
        );
        let back = document(
            reproject(GeometryInput::Document(&forward), 3857, 4326, OutputFormat::CoordinateDocument)
                .unwrap(),
        );

        let coords = coordinates(&back);
        assert!((coords[0] - lon).abs() < 1e-6, "lon {} became {}", lon, coords[0]);
        assert!((coords[1] - lat).abs() < 1e-6, "lat {} became {}", lat, coords[1]);
    }
}

#[test]
fn test_polygon_keeps_ring_structure() {
    let polygon = json!({
        "type": "Polygon",
        "coordinates": [[[30.0, 60.0], [31.0, 60.0], [31.0, 61.0], [30.0, 60.0]]]
    });

    let projected = document(
        reproject(GeometryInput::Document(&polygon), 4326, 3857, OutputFormat::CoordinateDocument)
            .unwrap(),
    );

    assert_eq!(projected["type"], "Polygon");
    let ring = projected["coordinates"][0].as_array().unwrap();
    assert_eq!(ring.len(), 4);
    assert_eq!(ring[0], ring[3]);
}

#[test]
fn test_wkt_input_to_wkt_output() {
    let output = reproject(
        GeometryInput::Serialized("LINESTRING(30 60, 31 61)"),
        4326,
        3857,
        OutputFormat::Wkt,
    )
    .unwrap();

    match output {
        GeometryOutput::Wkt(wkt) => assert!(wkt.starts_with("LINESTRING"), "got {}", wkt),
        GeometryOutput::Document(doc) => panic!("Expected WKT, got {}", doc),
    }
}

#[test]
fn test_garbage_is_geometry_error() {
    let err = reproject(GeometryInput::Serialized("not a geometry"), 4326, 3857, OutputFormat::Wkt)
        .unwrap_err();
    assert!(matches!(err, NgwError::Geometry { .. }));
}
