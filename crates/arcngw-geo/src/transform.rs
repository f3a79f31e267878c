//! CRS transformation between EPSG codes

use arcngw_core::error::{NgwError, Result};
use arcngw_core::models::{CoordinateTree, GeometryKind, Shape};
use geo::MapCoordsInPlace;
use proj::Proj;
use serde_json::Value;
use wkt::types::Coord;
use wkt::{ToWkt, TryFromWkt};

use crate::codec::to_flattened;

/// Geometry handed to [`reproject`]
#[derive(Debug, Clone, Copy)]
pub enum GeometryInput<'a> {
    /// `{type, coordinates}` document
    Document(&'a Value),
    /// WKT, or GeoJSON text when it starts with `{`
    Serialized(&'a str),
}

/// Encoding of the reprojected geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    CoordinateDocument,
    Wkt,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeometryOutput {
    Document(Value),
    Wkt(String),
}

impl GeometryOutput {
    /// WKT text, if this output was serialized as WKT
    pub fn into_wkt(self) -> Option<String> {
        match self {
            GeometryOutput::Wkt(text) => Some(text),
            GeometryOutput::Document(_) => None,
        }
    }
}

/// Reproject a geometry from one EPSG code to another
pub fn reproject(
    input: GeometryInput<'_>,
    from_epsg: u32,
    to_epsg: u32,
    format: OutputFormat,
) -> Result<GeometryOutput> {
    let mut geometry = parse_geometry(input)?;

    if from_epsg != to_epsg {
        let proj = projection(from_epsg, to_epsg)?;
        geometry
            .try_map_coords_in_place(|coord| {
                proj.convert((coord.x, coord.y)).map(|(x, y)| geo::Coord { x, y })
            })
            .map_err(projection_failed)?;
    }

    match format {
        OutputFormat::Wkt => Ok(GeometryOutput::Wkt(geometry.wkt_string())),
        OutputFormat::CoordinateDocument => {
            let document = geojson::Geometry::new(geojson::Value::from(&geometry));
            serde_json::to_value(document)
                .map(GeometryOutput::Document)
                .map_err(|e| NgwError::geometry(e.to_string()))
        }
    }
}

fn projection(from_epsg: u32, to_epsg: u32) -> Result<Proj> {
    tracing::debug!(from_epsg, to_epsg, "Reprojecting geometry");
    let from_proj = format!("EPSG:{}", from_epsg);
    let to_proj = format!("EPSG:{}", to_epsg);

    Proj::new_known_crs(&from_proj, &to_proj, None).map_err(|e| {
        NgwError::geometry(format!(
            "Failed to create projection from {} to {}: {}",
            from_proj, to_proj, e
        ))
    })
}

fn projection_failed(err: proj::ProjError) -> NgwError {
    NgwError::geometry(format!("Projection failed: {}", err))
}

/// Reproject a coordinate tree of the given type and serialize it as WKT.
///
/// Heights survive: x/y go through the projection and z is carried as is,
/// giving ISO `Z` WKT. Once any position has a height the whole geometry is
/// 3D and positions without one get 0.
pub fn reproject_tree(
    tree: &CoordinateTree,
    kind: GeometryKind,
    from_epsg: u32,
    to_epsg: u32,
) -> Result<String> {
    let flat = to_flattened(tree, kind)?;
    if flat.points.iter().all(|p| p.z.is_none()) {
        let document = tree.to_document(kind);
        let output =
            reproject(GeometryInput::Document(&document), from_epsg, to_epsg, OutputFormat::Wkt)?;
        return output
            .into_wkt()
            .ok_or_else(|| NgwError::geometry("reprojection did not produce WKT"));
    }

    let proj = if from_epsg != to_epsg { Some(projection(from_epsg, to_epsg)?) } else { None };
    let coords = flat
        .points
        .iter()
        .map(|p| -> Result<Coord<f64>> {
            let (x, y) = match &proj {
                Some(proj) => proj.convert((p.x, p.y)).map_err(projection_failed)?,
                None => (p.x, p.y),
            };
            Ok(Coord { x, y, z: Some(p.z.unwrap_or(0.0)), m: None })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut coords = coords.into_iter();
    let body = match kind {
        GeometryKind::Point => format!("({})", next_coord(&mut coords)?),
        _ => nested_wkt(&flat.shape, &mut coords)?,
    };
    Ok(format!("{} Z {}", wkt_name(kind), body))
}

fn wkt_name(kind: GeometryKind) -> &'static str {
    match kind {
        GeometryKind::Point => "POINT",
        GeometryKind::MultiPoint => "MULTIPOINT",
        GeometryKind::LineString => "LINESTRING",
        GeometryKind::MultiLineString => "MULTILINESTRING",
        GeometryKind::Polygon => "POLYGON",
        GeometryKind::MultiPolygon => "MULTIPOLYGON",
    }
}

fn nested_wkt(shape: &Shape, coords: &mut std::vec::IntoIter<Coord<f64>>) -> Result<String> {
    match shape {
        Shape::Position => Ok(next_coord(coords)?.to_string()),
        Shape::Parts(parts) => {
            let inner = parts
                .iter()
                .map(|part| nested_wkt(part, coords))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("({})", inner.join(", ")))
        }
    }
}

fn next_coord(coords: &mut std::vec::IntoIter<Coord<f64>>) -> Result<Coord<f64>> {
    coords.next().ok_or_else(|| NgwError::geometry("coordinate tree ran out of positions"))
}

fn parse_geometry(input: GeometryInput<'_>) -> Result<geo::Geometry<f64>> {
    match input {
        GeometryInput::Document(value) => from_document(value),
        GeometryInput::Serialized(text) => {
            let text = text.trim();
            if text.starts_with('{') {
                let value: Value = serde_json::from_str(text)
                    .map_err(|e| NgwError::geometry(format!("Malformed GeoJSON: {}", e)))?;
                from_document(&value)
            } else {
                geo::Geometry::<f64>::try_from_wkt_str(text)
                    .map_err(|e| NgwError::geometry(format!("Malformed WKT: {}", e)))
            }
        }
    }
}

fn from_document(value: &Value) -> Result<geo::Geometry<f64>> {
    let geometry = geojson::Geometry::from_json_value(value.clone())
        .map_err(|e| NgwError::geometry(format!("Malformed GeoJSON: {}", e)))?;
    geo::Geometry::<f64>::try_from(geometry.value)
        .map_err(|e| NgwError::geometry(format!("Unsupported GeoJSON geometry: {}", e)))
}
