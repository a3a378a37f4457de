pub mod ac;
pub mod combination;
pub mod error;
pub mod filter;
pub mod interval;
pub mod models;
pub mod presets;
pub mod quality;
pub mod reducer;
pub mod sampler;
pub mod settings;

pub use error::{ReductionError, Result};
