// src/analysis/zone.rs

use super::position_normalizer::NormalizedSample;
use crate::config::PhaseConfig;
use serde::{Deserialize, Serialize};

/// Coarse position of the tracked wrist relative to the hips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Zone {
    /// Low and in front of the hips (bell parked / set down)
    LowForward,
    /// Low and at or behind the hips (hike / backswing)
    LowBehind,
    /// Above the float line
    High,
    Mid,
}

impl Zone {
    pub fn classify(sample: &NormalizedSample, config: &PhaseConfig) -> Self {
        if sample.relative_height < config.low_threshold {
            if sample.relative_x > config.forward_threshold {
                Zone::LowForward
            } else if sample.relative_x <= config.behind_threshold {
                Zone::LowBehind
            } else {
                Zone::Mid
            }
        } else if sample.relative_height > config.float_threshold {
            Zone::High
        } else {
            Zone::Mid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::LowForward => "LOW_FORWARD",
            Zone::LowBehind => "LOW_BEHIND",
            Zone::High => "HIGH",
            Zone::Mid => "MID",
        }
    }
}
