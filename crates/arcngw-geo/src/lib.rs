//! arcngw Geo - Geometry encodings, reprojection, and identify buffers
//!
//! This crate holds the numeric side of the gateway: converting between the
//! nested and flattened geometry encodings, reprojecting between EPSG codes,
//! and building the tolerance buffer used by identify queries.

pub mod buffer;
pub mod codec;
pub mod transform;

pub use buffer::{buffer_polygon, buffer_wkt, ToleranceBuffer};
pub use codec::{to_coordinate_tree, to_flattened};
pub use transform::{reproject, reproject_tree, GeometryInput, GeometryOutput, OutputFormat};
