// src/synthetic.rs
//
// Synthetic pose captures for tests. The athlete stands still with hips at
// y = 0.6 and shoulders at y = 0.3 (torso length 0.3), facing +x, swinging
// with the right hand. Wrist motion is described in torso units relative to
// the hips and converted back to image coordinates.

use crate::types::{
    Landmark, LandmarkFrame, LEFT_HIP, LEFT_SHOULDER, LEFT_WRIST, MIN_LANDMARKS, RIGHT_HIP,
    RIGHT_SHOULDER, RIGHT_WRIST,
};
use std::f64::consts::PI;

pub const FPS: f64 = 30.0;

const HIP_X: f64 = 0.5;
const HIP_Y: f64 = 0.6;
const SHOULDER_Y: f64 = 0.3;
const TORSO: f64 = HIP_Y - SHOULDER_Y;

const BOTTOM_H: f64 = -0.5;
const PEAK_H: f64 = 1.1;
const BEHIND_X: f64 = -0.3;
const FRONT_X: f64 = 0.6;
const PARK_X: f64 = 0.5;

/// Swing period at speed factor 1.0
const BASE_PERIOD: f64 = 1.2;

/// One frame with the right wrist at `(relative_height, relative_x)`.
pub fn frame(timestamp: f64, relative_height: f64, relative_x: f64) -> LandmarkFrame {
    let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.2); MIN_LANDMARKS + 8];
    landmarks[LEFT_SHOULDER] = Landmark::new(HIP_X - 0.05, SHOULDER_Y, 0.9);
    landmarks[RIGHT_SHOULDER] = Landmark::new(HIP_X + 0.05, SHOULDER_Y, 0.9);
    landmarks[LEFT_HIP] = Landmark::new(HIP_X - 0.05, HIP_Y, 0.9);
    landmarks[RIGHT_HIP] = Landmark::new(HIP_X + 0.05, HIP_Y, 0.9);
    landmarks[LEFT_WRIST] = Landmark::new(HIP_X, HIP_Y + 0.1, 0.3);
    landmarks[RIGHT_WRIST] = Landmark::new(
        HIP_X + relative_x * TORSO,
        HIP_Y - relative_height * TORSO,
        0.95,
    );
    LandmarkFrame::new(timestamp, landmarks)
}

/// Frame with too few landmarks to analyse.
pub fn inert_frame(timestamp: f64) -> LandmarkFrame {
    LandmarkFrame::new(timestamp, vec![Landmark::new(0.5, 0.5, 0.9); 10])
}

struct Recorder {
    t: f64,
    frames: Vec<LandmarkFrame>,
}

impl Recorder {
    fn push(&mut self, h: f64, x: f64) {
        self.frames.push(frame(self.t, h, x));
        self.t += 1.0 / FPS;
    }

    fn hold(&mut self, secs: f64, h: f64, x: f64) {
        for _ in 0..(secs * FPS).round() as usize {
            self.push(h, x);
        }
    }

    fn glide(&mut self, secs: f64, from: (f64, f64), to: (f64, f64)) {
        let n = (secs * FPS).round() as usize;
        for i in 1..=n {
            let k = i as f64 / n as f64;
            self.push(from.0 + (to.0 - from.0) * k, from.1 + (to.1 - from.1) * k);
        }
    }

    /// One swing from the bottom of the backswing to the same point, or to
    /// the parked position when `park` is set.
    fn swing(&mut self, period: f64, park: bool) {
        let n = (period * FPS).round() as usize;
        for i in 1..=n {
            let phase = i as f64 / n as f64;
            let lift = (1.0 - (2.0 * PI * phase).cos()) / 2.0;
            let h = BOTTOM_H + (PEAK_H - BOTTOM_H) * lift;
            let x = if park && phase > 0.5 {
                PARK_X + (FRONT_X - PARK_X) * lift
            } else {
                BEHIND_X + (FRONT_X - BEHIND_X) * lift
            };
            self.push(h, x);
        }
    }
}

/// Parked start, one swing per entry in `speed_factors` (1.0 = base speed,
/// 0.5 = half as fast), then parked again.
pub fn swing_session(speed_factors: &[f64]) -> Vec<LandmarkFrame> {
    let mut rec = Recorder {
        t: 0.0,
        frames: Vec::new(),
    };

    rec.hold(1.0, BOTTOM_H, PARK_X);
    rec.glide(0.5, (BOTTOM_H, PARK_X), (BOTTOM_H, BEHIND_X));
    for (k, factor) in speed_factors.iter().enumerate() {
        rec.swing(BASE_PERIOD / factor, k + 1 == speed_factors.len());
    }
    rec.hold(1.0, BOTTOM_H, PARK_X);

    rec.frames
}
