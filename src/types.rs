// src/types.rs

use serde::{Deserialize, Serialize};

// ============================================================================
// LANDMARK INPUT
// ============================================================================

/// MediaPipe pose landmark indices used by the normalizer.
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;

/// Frames with fewer landmarks than this are inert.
pub const MIN_LANDMARKS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized image x (0-1)
    pub x: f64,
    /// Normalized image y (0-1, grows downward)
    pub y: f64,
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Seconds since capture start
    pub timestamp: f64,
    pub landmarks: Vec<Landmark>,
}

impl LandmarkFrame {
    pub fn new(timestamp: f64, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp,
            landmarks,
        }
    }

    /// True when every landmark the normalizer reads is present.
    pub fn has_required_landmarks(&self) -> bool {
        self.landmarks.len() >= MIN_LANDMARKS
    }

    pub fn landmark(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }
}

// ============================================================================
// MOVEMENT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    SnatchLeft,
    SnatchRight,
    SwingLeft,
    SwingRight,
    TwoArmSwing,
}

impl Default for MovementType {
    fn default() -> Self {
        Self::TwoArmSwing
    }
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SnatchLeft => "snatch_left",
            Self::SnatchRight => "snatch_right",
            Self::SwingLeft => "swing_left",
            Self::SwingRight => "swing_right",
            Self::TwoArmSwing => "two_arm_swing",
        }
    }

    pub fn is_snatch(&self) -> bool {
        matches!(self, Self::SnatchLeft | Self::SnatchRight)
    }

    /// Side named by the movement, if any. Two-arm swings leave the
    /// choice to the normalizer's sticky selection.
    pub fn side_hint(&self) -> Option<Side> {
        match self {
            Self::SnatchLeft | Self::SwingLeft => Some(Side::Left),
            Self::SnatchRight | Self::SwingRight => Some(Side::Right),
            Self::TwoArmSwing => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

// ============================================================================
// REPS AND RESULTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepMetric {
    /// Ordinal among valid reps; `None` for rejected reps.
    pub rep_index: Option<usize>,
    /// Ordinal among every completed rep, valid or not.
    pub sequence: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub peak_speed: f64,
    pub peak_height: f64,
    pub is_valid: bool,
    pub is_below_threshold: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AntResult {
    pub ant_reached: bool,
    pub ant_rep_index: Option<usize>,
    pub ant_timestamp: Option<f64>,
    pub drop_percent_at_ant: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisDiagnostics {
    pub fps_used: f64,
    pub frames_sampled: u64,
    pub frames_skipped: u64,
    pub invalid_reps_filtered: usize,
    pub baseline_reps_used: usize,
    pub threshold_speed: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub movement_type: MovementType,
    pub total_valid_reps: usize,
    pub video_duration_seconds: f64,
    pub baseline_speed: Option<f64>,
    pub ant_reached: bool,
    pub ant_rep_index: Option<usize>,
    pub ant_timestamp_seconds: Option<f64>,
    pub drop_percent_at_ant: Option<f64>,
    pub rep_metrics: Vec<RepMetric>,
    pub diagnostics: AnalysisDiagnostics,
}

impl AnalysisResult {
    /// Whether enough valid reps were found for the ANT figure to mean much.
    pub fn meets_minimum(&self, min_valid_reps: usize) -> bool {
        self.total_valid_reps >= min_valid_reps
    }
}

/// Capture-level facts the pipeline cannot see from the frames it was fed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureInfo {
    pub fps_used: f64,
    pub video_duration_seconds: f64,
}
