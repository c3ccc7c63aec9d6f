// src/config.rs

use crate::types::MovementType;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{0}")]
    Inconsistent(String),
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field })
    }
}

fn at_least(field: &'static str, value: f64, min: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < min {
        return Err(ConfigError::TooSmall { field, min, value });
    }
    Ok(())
}

fn count_at_least(field: &'static str, value: usize, min: usize) -> Result<(), ConfigError> {
    at_least(field, value as f64, min as f64)
}

fn within(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

// ============================================================================
// SECTIONS
// ============================================================================

/// Which image direction counts as "in front of the hips".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Learned from the wrist offset on the frame the side is pinned.
    #[default]
    Auto,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Trailing frames averaged into the smoothed wrist/hip position
    pub smoothing_window: usize,
    /// Hip and shoulder visibility needed to calibrate torso length
    pub calibration_confidence: f64,
    /// Visibility margin that makes one wrist clearly better tracked
    pub side_margin: f64,
    pub facing: Facing,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 3,
            calibration_confidence: 0.5,
            side_margin: 0.1,
            facing: Facing::Auto,
        }
    }
}

impl NormalizerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        count_at_least("normalizer.smoothing_window", self.smoothing_window, 1)?;
        within(
            "normalizer.calibration_confidence",
            self.calibration_confidence,
            0.0,
            1.0,
        )?;
        within("normalizer.side_margin", self.side_margin, 0.0, 1.0)?;
        Ok(())
    }
}

/// Phase machine thresholds. Heights and offsets are in torso lengths,
/// velocities in torso lengths per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseConfig {
    pub low_threshold: f64,
    pub float_threshold: f64,
    pub forward_threshold: f64,
    pub behind_threshold: f64,
    pub min_drive_velocity: f64,
    /// Negative: the wrist must be falling faster than this
    pub min_drop_velocity: f64,
    pub min_frames_in_phase: u32,
    pub stable_velocity: f64,
    pub stable_frames: u32,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            low_threshold: 0.0,
            float_threshold: 0.6,
            forward_threshold: 0.15,
            behind_threshold: 0.15,
            min_drive_velocity: 0.8,
            min_drop_velocity: -0.8,
            min_frames_in_phase: 2,
            stable_velocity: 0.15,
            stable_frames: 6,
        }
    }
}

impl PhaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("phase.low_threshold", self.low_threshold)?;
        finite("phase.float_threshold", self.float_threshold)?;
        at_least("phase.forward_threshold", self.forward_threshold, 0.0)?;
        at_least("phase.behind_threshold", self.behind_threshold, 0.0)?;
        at_least("phase.min_drive_velocity", self.min_drive_velocity, 0.0)?;
        at_least("phase.stable_velocity", self.stable_velocity, 0.0)?;
        finite("phase.min_drop_velocity", self.min_drop_velocity)?;
        count_at_least(
            "phase.min_frames_in_phase",
            self.min_frames_in_phase as usize,
            1,
        )?;

        if self.min_drop_velocity > 0.0 {
            return Err(ConfigError::Inconsistent(format!(
                "phase.min_drop_velocity must be <= 0 (falling), got {}",
                self.min_drop_velocity
            )));
        }
        if self.float_threshold <= self.low_threshold {
            return Err(ConfigError::Inconsistent(format!(
                "phase.float_threshold ({}) must exceed phase.low_threshold ({})",
                self.float_threshold, self.low_threshold
            )));
        }
        if self.behind_threshold > self.forward_threshold {
            return Err(ConfigError::Inconsistent(format!(
                "phase.behind_threshold ({}) must not exceed phase.forward_threshold ({})",
                self.behind_threshold, self.forward_threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepValidationConfig {
    /// Seconds
    pub min_rep_duration: f64,
    /// Seconds
    pub max_rep_duration: f64,
    /// Peak height above the hips (torso lengths) a swing must reach
    pub min_displacement_swing: f64,
    pub min_displacement_snatch: f64,
}

impl Default for RepValidationConfig {
    fn default() -> Self {
        Self {
            min_rep_duration: 0.4,
            max_rep_duration: 4.0,
            min_displacement_swing: 0.15,
            min_displacement_snatch: 0.25,
        }
    }
}

impl RepValidationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        at_least("reps.min_rep_duration", self.min_rep_duration, 0.0)?;
        at_least("reps.max_rep_duration", self.max_rep_duration, 0.0)?;
        at_least("reps.min_displacement_swing", self.min_displacement_swing, 0.0)?;
        at_least(
            "reps.min_displacement_snatch",
            self.min_displacement_snatch,
            0.0,
        )?;
        if self.min_rep_duration >= self.max_rep_duration {
            return Err(ConfigError::Inconsistent(format!(
                "reps.min_rep_duration ({}) must be below reps.max_rep_duration ({})",
                self.min_rep_duration, self.max_rep_duration
            )));
        }
        Ok(())
    }

    pub fn min_displacement(&self, movement: MovementType) -> f64 {
        if movement.is_snatch() {
            self.min_displacement_snatch
        } else {
            self.min_displacement_swing
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntConfig {
    pub baseline_reps: usize,
    /// Fractional drop from baseline (0.20 = 20%)
    pub drop_threshold: f64,
    pub smoothing_window: usize,
    pub sustain_count: usize,
}

impl Default for AntConfig {
    fn default() -> Self {
        Self {
            baseline_reps: 5,
            drop_threshold: 0.20,
            smoothing_window: 3,
            sustain_count: 2,
        }
    }
}

impl AntConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        count_at_least("ant.baseline_reps", self.baseline_reps, 3)?;
        count_at_least("ant.smoothing_window", self.smoothing_window, 1)?;
        count_at_least("ant.sustain_count", self.sustain_count, 1)?;
        finite("ant.drop_threshold", self.drop_threshold)?;
        if self.drop_threshold <= 0.0 || self.drop_threshold >= 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "ant.drop_threshold",
                min: 0.0,
                max: 1.0,
                value: self.drop_threshold,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub input_dir: String,
    pub output_dir: String,
    pub movement_type: MovementType,
    /// Captures are decimated to roughly this rate before analysis
    pub target_fps: f64,
    pub min_duration_secs: f64,
    pub min_valid_reps: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            input_dir: "captures".to_string(),
            output_dir: "reports".to_string(),
            movement_type: MovementType::default(),
            target_fps: 15.0,
            min_duration_secs: 5.0,
            min_valid_reps: 10,
        }
    }
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("capture.target_fps", self.target_fps)?;
        if self.target_fps <= 0.0 {
            return Err(ConfigError::Inconsistent(format!(
                "capture.target_fps must be positive, got {}",
                self.target_fps
            )));
        }
        at_least("capture.min_duration_secs", self.min_duration_secs, 0.0)?;
        Ok(())
    }
}

// ============================================================================
// ROOT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub normalizer: NormalizerConfig,
    pub phase: PhaseConfig,
    pub reps: RepValidationConfig,
    pub ant: AntConfig,
    pub capture: CaptureConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.normalizer.validate()?;
        self.phase.validate()?;
        self.reps.validate()?;
        self.ant.validate()?;
        self.capture.validate()?;
        Ok(())
    }
}
