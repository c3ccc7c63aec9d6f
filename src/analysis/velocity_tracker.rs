// src/analysis/velocity_tracker.rs

/// Finite-difference velocity between consecutive normalized samples.
pub struct VelocityTracker {
    last: Option<(f64, f64, f64)>, // (relative_x, relative_height, timestamp_s)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Velocity in torso lengths per second. The first sample, and any
    /// sample that does not advance the clock, yields zero.
    pub fn update(&mut self, relative_x: f64, relative_height: f64, timestamp: f64) -> Velocity {
        let velocity = match self.last {
            Some((prev_x, prev_h, prev_t)) => {
                let dt = timestamp - prev_t;
                if dt > 0.0 {
                    Velocity {
                        x: (relative_x - prev_x) / dt,
                        y: (relative_height - prev_h) / dt,
                    }
                } else {
                    Velocity::default()
                }
            }
            None => Velocity::default(),
        };

        self.last = Some((relative_x, relative_height, timestamp));
        velocity
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_has_zero_velocity() {
        let mut tracker = VelocityTracker::new();
        assert_eq!(tracker.update(0.2, 0.5, 1.0), Velocity::default());
    }

    #[test]
    fn test_finite_difference() {
        let mut tracker = VelocityTracker::new();
        tracker.update(0.0, 0.0, 0.0);
        let v = tracker.update(0.1, -0.2, 0.1);
        assert!((v.x - 1.0).abs() < 1e-9);
        assert!((v.y + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_timestamp_yields_zero() {
        let mut tracker = VelocityTracker::new();
        tracker.update(0.0, 0.0, 0.5);
        let v = tracker.update(0.3, 0.3, 0.5);
        assert_eq!(v, Velocity::default());
        assert!(v.x.is_finite() && v.y.is_finite());
    }
}
