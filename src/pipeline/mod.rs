// src/pipeline/mod.rs

pub mod events;
pub mod metrics;
pub mod orchestrator;

pub use events::PipelineEvent;
pub use metrics::{MetricsSummary, PipelineMetrics};
pub use orchestrator::{FrameReport, ThresholdPipeline};
