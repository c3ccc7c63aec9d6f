// src/analysis/position_normalizer.rs
//
// Turns raw pose landmarks into torso-normalized wrist coordinates relative
// to the hip centre. One wrist is tracked for the lifetime of the instance.

use super::velocity_tracker::VelocityTracker;
use crate::config::{ConfigError, Facing, NormalizerConfig};
use crate::smoother::{Point2, PositionSmoother, TrackedPoints};
use crate::types::{
    LandmarkFrame, MovementType, Side, LEFT_HIP, LEFT_SHOULDER, LEFT_WRIST, RIGHT_HIP,
    RIGHT_SHOULDER, RIGHT_WRIST,
};
use tracing::{debug, info};

/// Shorter torsos than this (normalized image units) are treated as a
/// degenerate pose and do not calibrate.
const MIN_TORSO_LENGTH: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedSample {
    pub timestamp: f64,
    /// Wrist height above the hip centre, torso lengths (positive = above)
    pub relative_height: f64,
    /// Wrist offset in front of the hip centre, torso lengths
    pub relative_x: f64,
    pub velocity_y: f64,
    pub velocity_x: f64,
    /// False until torso length is known; all measurements are zero then
    pub calibrated: bool,
}

impl NormalizedSample {
    fn uncalibrated(timestamp: f64) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }
}

struct BodyPoints {
    left_wrist: (Point2, f64),
    right_wrist: (Point2, f64),
    hip: Point2,
    hip_confidence: f64,
    shoulder: Point2,
    shoulder_confidence: f64,
}

impl BodyPoints {
    fn from_frame(frame: &LandmarkFrame) -> Option<Self> {
        if !frame.has_required_landmarks() {
            return None;
        }
        let get = |i: usize| frame.landmark(i).map(|l| (Point2::new(l.x, l.y), l.visibility));

        let left_wrist = get(LEFT_WRIST)?;
        let right_wrist = get(RIGHT_WRIST)?;
        let (lh, lh_vis) = get(LEFT_HIP)?;
        let (rh, rh_vis) = get(RIGHT_HIP)?;
        let (ls, ls_vis) = get(LEFT_SHOULDER)?;
        let (rs, rs_vis) = get(RIGHT_SHOULDER)?;

        Some(Self {
            left_wrist,
            right_wrist,
            hip: Point2::midpoint(lh, rh),
            hip_confidence: (lh_vis + rh_vis) / 2.0,
            shoulder: Point2::midpoint(ls, rs),
            shoulder_confidence: (ls_vis + rs_vis) / 2.0,
        })
    }

    fn wrist(&self, side: Side) -> Point2 {
        match side {
            Side::Left => self.left_wrist.0,
            Side::Right => self.right_wrist.0,
        }
    }
}

pub struct PositionNormalizer {
    config: NormalizerConfig,
    side_hint: Option<Side>,
    side: Option<Side>,
    forward_sign: Option<f64>,
    torso_length: Option<f64>,
    smoother: PositionSmoother,
    velocity: VelocityTracker,
}

impl PositionNormalizer {
    pub fn new(config: NormalizerConfig, movement: MovementType) -> Result<Self, ConfigError> {
        config.validate()?;
        let side_hint = movement.side_hint();
        Ok(Self {
            smoother: PositionSmoother::new(config.smoothing_window),
            config,
            side_hint,
            side: side_hint,
            forward_sign: None,
            torso_length: None,
            velocity: VelocityTracker::new(),
        })
    }

    /// Process one frame. Returns `None` for inert frames (missing landmarks).
    pub fn process(&mut self, frame: &LandmarkFrame) -> Option<NormalizedSample> {
        let body = match BodyPoints::from_frame(frame) {
            Some(b) => b,
            None => {
                debug!(
                    "Skipping frame at {:.3}s: {} landmarks",
                    frame.timestamp,
                    frame.landmarks.len()
                );
                return None;
            }
        };

        let side = self.pin_side(&body);
        let wrist = body.wrist(side);
        self.pin_forward(wrist, body.hip);
        self.try_calibrate(&body, frame.timestamp);

        let smoothed = self.smoother.smooth(TrackedPoints {
            wrist,
            hip: body.hip,
        });

        let torso = match self.torso_length {
            Some(t) => t,
            None => return Some(NormalizedSample::uncalibrated(frame.timestamp)),
        };
        let forward = self.forward_sign.unwrap_or(1.0);

        let relative_height = (smoothed.hip.y - smoothed.wrist.y) / torso;
        let relative_x = forward * (smoothed.wrist.x - smoothed.hip.x) / torso;
        let velocity = self
            .velocity
            .update(relative_x, relative_height, frame.timestamp);

        Some(NormalizedSample {
            timestamp: frame.timestamp,
            relative_height,
            relative_x,
            velocity_y: velocity.y,
            velocity_x: velocity.x,
            calibrated: true,
        })
    }

    /// Sticky side selection: the first classifiable frame decides.
    fn pin_side(&mut self, body: &BodyPoints) -> Side {
        if let Some(side) = self.side {
            return side;
        }

        let (left, left_vis) = body.left_wrist;
        let (right, right_vis) = body.right_wrist;

        let side = if (left_vis - right_vis).abs() > self.config.side_margin {
            if left_vis > right_vis {
                Side::Left
            } else {
                Side::Right
            }
        } else if (left.x - body.hip.x).abs() > (right.x - body.hip.x).abs() {
            // Wrist farther from the hips is the one holding the bell
            Side::Left
        } else {
            Side::Right
        };

        info!(
            "✓ Tracking {:?} wrist (visibility L={:.2} R={:.2})",
            side, left_vis, right_vis
        );
        self.side = Some(side);
        side
    }

    fn pin_forward(&mut self, wrist: Point2, hip: Point2) {
        if self.forward_sign.is_some() {
            return;
        }
        let sign = match self.config.facing {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
            Facing::Auto => {
                if wrist.x - hip.x < 0.0 {
                    -1.0
                } else {
                    1.0
                }
            }
        };
        debug!("Forward direction pinned to {:+.0} x", sign);
        self.forward_sign = Some(sign);
    }

    /// First-write-wins torso calibration.
    fn try_calibrate(&mut self, body: &BodyPoints, timestamp: f64) {
        if self.torso_length.is_some() {
            return;
        }
        let min_conf = self.config.calibration_confidence;
        if body.hip_confidence <= min_conf || body.shoulder_confidence <= min_conf {
            return;
        }

        let length = (body.hip.y - body.shoulder.y).abs();
        if length < MIN_TORSO_LENGTH {
            return;
        }

        info!(
            "✓ Torso length calibrated at {:.3}s: {:.4}",
            timestamp, length
        );
        self.torso_length = Some(length);
    }

    pub fn torso_length(&self) -> Option<f64> {
        self.torso_length
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    pub fn is_calibrated(&self) -> bool {
        self.torso_length.is_some()
    }

    /// Swap thresholds without losing calibration or the pinned side.
    pub fn reconfigure(&mut self, config: NormalizerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.smoother.set_window_size(config.smoothing_window);
        self.config = config;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.side = self.side_hint;
        self.forward_sign = None;
        self.torso_length = None;
        self.smoother.reset();
        self.velocity.reset();
    }
}
