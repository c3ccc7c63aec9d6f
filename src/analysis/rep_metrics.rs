// src/analysis/rep_metrics.rs
//
// Turns raw reps from the phase classifier into RepMetric records and
// decides which ones are valid enough to feed the ANT calculation.

use super::phase_classifier::CompletedRep;
use crate::config::{ConfigError, RepValidationConfig};
use crate::types::{MovementType, RepMetric};
use tracing::{info, warn};

/// Why a rep was rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    TooShort { duration: f64 },
    TooLong { duration: f64 },
    TooLow { peak_height: f64, required: f64 },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::TooShort { duration } => write!(f, "too short ({:.2}s)", duration),
            RejectReason::TooLong { duration } => write!(f, "too long ({:.2}s)", duration),
            RejectReason::TooLow {
                peak_height,
                required,
            } => write!(f, "too low (peak {:.2} < {:.2})", peak_height, required),
        }
    }
}

pub struct RepMetricsAggregator {
    config: RepValidationConfig,
    movement: MovementType,
    reps: Vec<RepMetric>,
    valid_count: usize,
}

impl RepMetricsAggregator {
    pub fn new(config: RepValidationConfig, movement: MovementType) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            movement,
            reps: Vec::new(),
            valid_count: 0,
        })
    }

    fn check(&self, duration: f64, peak_height: f64) -> Option<RejectReason> {
        if duration < self.config.min_rep_duration {
            return Some(RejectReason::TooShort { duration });
        }
        if duration > self.config.max_rep_duration {
            return Some(RejectReason::TooLong { duration });
        }
        let required = self.config.min_displacement(self.movement);
        if peak_height < required {
            return Some(RejectReason::TooLow {
                peak_height,
                required,
            });
        }
        None
    }

    pub fn on_raw_rep(&mut self, rep: &CompletedRep) -> RepMetric {
        let duration = rep.end_time - rep.start_time;
        let sequence = self.reps.len();
        let rejection = self.check(duration, rep.peak_height);

        let rep_index = match rejection {
            None => {
                let index = self.valid_count;
                self.valid_count += 1;
                info!(
                    "✓ Rep {} ({:.2}s, peak speed {:.2}, mean {:.2}, height {:.2})",
                    index + 1,
                    duration,
                    rep.peak_velocity,
                    rep.mean_velocity,
                    rep.peak_height
                );
                Some(index)
            }
            Some(reason) => {
                warn!("Rejected rep at {:.2}s: {}", rep.start_time, reason);
                None
            }
        };

        let metric = RepMetric {
            rep_index,
            sequence,
            start_time: rep.start_time,
            end_time: rep.end_time,
            duration,
            peak_speed: rep.peak_velocity,
            peak_height: rep.peak_height,
            is_valid: rejection.is_none(),
            is_below_threshold: false,
        };
        self.reps.push(metric.clone());
        metric
    }

    /// Valid reps in rep-index order.
    pub fn valid_reps(&self) -> Vec<RepMetric> {
        self.reps.iter().filter(|r| r.is_valid).cloned().collect()
    }

    pub fn all_reps(&self) -> &[RepMetric] {
        &self.reps
    }

    pub fn valid_count(&self) -> usize {
        self.valid_count
    }

    pub fn invalid_count(&self) -> usize {
        self.reps.len() - self.valid_count
    }

    pub fn movement(&self) -> MovementType {
        self.movement
    }

    /// New limits apply to reps completed after this call.
    pub fn reconfigure(&mut self, config: RepValidationConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.reps.clear();
        self.valid_count = 0;
    }
}
