mod request;
mod response;

pub use request::{parse_numeric_segment, CallbackQuery, ExportParams, LayerPath, MapPath};
pub use response::{HealthResponse, LayerEntry, LayerList, MapCapabilities, SaveResponse, SpatialReference};
