/// Pipeline orchestrator and presets

pub mod pipeline;
pub mod presets;

pub use pipeline::{HostEvent, Pipeline};
