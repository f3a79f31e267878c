mod health;
mod map_server;
mod save;

pub use health::health_check;
pub use map_server::{export_image, identify, layer_info, map_capabilities, map_layers};
pub use save::save_feature;
