pub mod animate;
pub mod config;
pub mod export;
pub mod geometry;
pub mod pipeline;
pub mod render;
pub mod table;

pub use config::Config;
pub use pipeline::{run, RunSummary};
