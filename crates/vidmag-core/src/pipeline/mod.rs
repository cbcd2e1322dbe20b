pub mod config;
mod magnifier;
mod shared;
mod types;

pub use config::{ParameterStore, SpatialFilterType, TemporalFilterType};
pub use magnifier::Magnifier;
pub use shared::ParameterHandle;
pub use types::FrameOutput;
