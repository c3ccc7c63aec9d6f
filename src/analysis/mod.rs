// src/analysis/mod.rs
//
// Rep analysis modules.
//
// Signal flow:
//   LandmarkFrame → position_normalizer → NormalizedSample
//                 → phase_classifier (zone + FSM) → CompletedRep
//                 → rep_metrics → RepMetric (valid reps only) → ant_detector → AntResult
//
// Orchestrated by pipeline::ThresholdPipeline.

pub mod ant_detector;
pub mod phase_classifier;
pub mod position_normalizer;
pub mod rep_metrics;
pub mod velocity_tracker;
pub mod zone;

pub use ant_detector::AntDetector;
pub use phase_classifier::{ClassifierOutput, CompletedRep, Phase, PhaseClassifier, PhaseEvent};
pub use position_normalizer::{NormalizedSample, PositionNormalizer};
pub use rep_metrics::{RejectReason, RepMetricsAggregator};
pub use zone::Zone;
