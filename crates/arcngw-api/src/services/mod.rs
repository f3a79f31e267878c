mod export;
mod feature_writer;
mod identify;
mod map_descriptor;

pub use export::ExportProxy;
pub use feature_writer::FeatureWriter;
pub use identify::IdentifyQueryBuilder;
pub use map_descriptor::{MapDescriptorBuilder, MapDocument};
