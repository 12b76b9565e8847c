// Library exports for iconkit

pub mod config;
pub mod pipeline;
pub mod pipeline_runner;

pub use config::Config;
pub use pipeline::{background, image_io, resize, rounded};
