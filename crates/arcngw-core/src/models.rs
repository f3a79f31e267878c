pub mod feature;
pub mod geometry;
pub mod identify;
pub mod resource;

pub use feature::{
    invalid_geometry, CreateFeatureRequest, FeatureExtensions, FeaturePayload, FeatureTarget,
    GeometryField, SaveRequest, UpdateFeatureRequest, GEOMETRY_DOC_HINT,
};
pub use geometry::{
    ConsumptionOrder, CoordinateTree, FlattenedGeometry, GeometryKind, PointRecord, Shape,
};
pub use identify::{
    parse_layer_selection, IdentifyParams, IdentifyQuery, IdentifyResult, IdentifyResults,
    ImageDisplay, MapExtent, QueryPoint,
};
pub use resource::{ResourceDescriptor, WebMap, WebMapItem};
