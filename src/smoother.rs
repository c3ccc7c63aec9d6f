// src/smoother.rs

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(a: Point2, b: Point2) -> Self {
        Self::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }
}

/// Wrist and hip-centre positions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackedPoints {
    pub wrist: Point2,
    pub hip: Point2,
}

/// Temporal smoother over a sliding window of tracked positions.
///
/// The smoothed value is the arithmetic mean of everything in the window,
/// so the first few frames are averaged over what is available.
pub struct PositionSmoother {
    history: VecDeque<TrackedPoints>,
    window_size: usize,
}

impl PositionSmoother {
    /// # Arguments
    /// * `window_size` - Number of frames to average (at least 1)
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            history: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    pub fn smooth(&mut self, points: TrackedPoints) -> TrackedPoints {
        self.history.push_back(points);

        // Maintain window size
        while self.history.len() > self.window_size {
            self.history.pop_front();
        }

        let n = self.history.len() as f64;
        let mut sum = TrackedPoints::default();
        for p in &self.history {
            sum.wrist.x += p.wrist.x;
            sum.wrist.y += p.wrist.y;
            sum.hip.x += p.hip.x;
            sum.hip.y += p.hip.y;
        }

        TrackedPoints {
            wrist: Point2::new(sum.wrist.x / n, sum.wrist.y / n),
            hip: Point2::new(sum.hip.x / n, sum.hip.y / n),
        }
    }

    /// Change the window length, dropping the oldest samples if it shrank.
    pub fn set_window_size(&mut self, window_size: usize) {
        self.window_size = window_size.max(1);
        while self.history.len() > self.window_size {
            self.history.pop_front();
        }
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn history_size(&self) -> usize {
        self.history.len()
    }
}
