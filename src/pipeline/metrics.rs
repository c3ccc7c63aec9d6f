// src/pipeline/metrics.rs
//
// Per-analysis counters. One pipeline instance owns one set, so plain
// integers are enough.

use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub frames_seen: u64,
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub frames_uncalibrated: u64,
    pub phase_transitions: u64,
    pub reps_completed: u64,
    pub valid_reps: u64,
    pub invalid_reps: u64,
    pub started_at: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            frames_seen: 0,
            frames_processed: 0,
            frames_skipped: 0,
            frames_uncalibrated: 0,
            phase_transitions: 0,
            reps_completed: 0,
            valid_reps: 0,
            invalid_reps: 0,
            started_at: Instant::now(),
        }
    }

    /// Frames per second of wall-clock processing time
    pub fn fps(&self) -> f64 {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            self.frames_seen as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            frames_seen: self.frames_seen,
            frames_processed: self.frames_processed,
            frames_skipped: self.frames_skipped,
            frames_uncalibrated: self.frames_uncalibrated,
            phase_transitions: self.phase_transitions,
            reps_completed: self.reps_completed,
            valid_reps: self.valid_reps,
            invalid_reps: self.invalid_reps,
            fps: self.fps(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub frames_seen: u64,
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub frames_uncalibrated: u64,
    pub phase_transitions: u64,
    pub reps_completed: u64,
    pub valid_reps: u64,
    pub invalid_reps: u64,
    pub fps: f64,
    pub elapsed_secs: f64,
}
