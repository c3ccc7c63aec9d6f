// src/lib.rs

pub mod analysis;
pub mod config;
pub mod landmark_source;
pub mod pipeline;
pub mod smoother;
pub mod types;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod synthetic;

pub use config::{Config, ConfigError};
pub use pipeline::{FrameReport, PipelineEvent, ThresholdPipeline};
pub use types::{AnalysisResult, AntResult, LandmarkFrame, MovementType, RepMetric};
