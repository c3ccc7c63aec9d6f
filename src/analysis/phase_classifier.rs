// src/analysis/phase_classifier.rs
//
// Swing phase state machine.
//
//   READY → HIKE → DRIVE → FLOAT → DROP → HIKE ...   (rep completes on DROP→HIKE)
//                        ╰──────────→ DROP → PARK → READY   (rep completes on DROP→PARK)
//
// Transitions are debounced two ways: the machine must have dwelt in the
// current phase for `min_frames_in_phase` frames, and the same transition
// condition must have held for that many consecutive frames. Peak statistics
// and the stability streak are updated on every calibrated frame.
//
// The phase configuration is snapshotted when a rep starts so a live
// reconfigure never mixes thresholds within one rep.

use super::position_normalizer::NormalizedSample;
use super::zone::Zone;
use crate::config::{ConfigError, PhaseConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Ready,
    Hike,
    Drive,
    Float,
    Drop,
    Park,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Ready => "READY",
            Phase::Hike => "HIKE",
            Phase::Drive => "DRIVE",
            Phase::Float => "FLOAT",
            Phase::Drop => "DROP",
            Phase::Park => "PARK",
        }
    }
}

/// Accumulator for the rep in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRep {
    pub start_time: f64,
    pub drive_start_time: Option<f64>,
    /// Time the highest point so far was reached
    pub float_time: Option<f64>,
    pub peak_height: f64,
    /// Positive vertical velocities seen during DRIVE/FLOAT
    pub velocities: Vec<f64>,
    pub peak_velocity: f64,
}

impl RawRep {
    fn start(timestamp: f64, height: f64) -> Self {
        Self {
            start_time: timestamp,
            drive_start_time: None,
            float_time: None,
            peak_height: height,
            velocities: Vec::new(),
            peak_velocity: 0.0,
        }
    }

    fn track(&mut self, sample: &NormalizedSample) {
        if sample.relative_height > self.peak_height {
            self.peak_height = sample.relative_height;
            self.float_time = Some(sample.timestamp);
        }
        if sample.velocity_y > 0.0 {
            self.velocities.push(sample.velocity_y);
            if sample.velocity_y > self.peak_velocity {
                self.peak_velocity = sample.velocity_y;
            }
        }
    }

    fn finish(self, end_time: f64) -> CompletedRep {
        let mean_velocity = if self.velocities.is_empty() {
            0.0
        } else {
            self.velocities.iter().sum::<f64>() / self.velocities.len() as f64
        };
        CompletedRep {
            start_time: self.start_time,
            end_time,
            drive_start_time: self.drive_start_time,
            float_time: self.float_time,
            peak_height: self.peak_height,
            peak_velocity: self.peak_velocity,
            mean_velocity,
        }
    }
}

/// Timing and peak statistics of a finished rep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletedRep {
    pub start_time: f64,
    pub end_time: f64,
    pub drive_start_time: Option<f64>,
    pub float_time: Option<f64>,
    pub peak_height: f64,
    pub peak_velocity: f64,
    pub mean_velocity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PhaseEvent {
    PhaseChanged {
        from: Phase,
        to: Phase,
        /// Completed reps, counting one finished on this very frame
        rep_count: usize,
        timestamp: f64,
    },
    RepCompleted(CompletedRep),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierOutput {
    pub phase: Phase,
    /// `None` while the normalizer is uncalibrated
    pub zone: Option<Zone>,
    /// Rep completion (if any) precedes the phase change it caused
    pub events: Vec<PhaseEvent>,
}

// ============================================================================
// CLASSIFIER
// ============================================================================

pub struct PhaseClassifier {
    config: PhaseConfig,
    rep_config: Option<PhaseConfig>,
    phase: Phase,
    frames_in_phase: u32,
    pending: Option<(Phase, u32)>,
    stable_streak: u32,
    rep_count: usize,
    current_rep: Option<RawRep>,
}

impl PhaseClassifier {
    pub fn new(config: PhaseConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rep_config: None,
            phase: Phase::Ready,
            frames_in_phase: 0,
            pending: None,
            stable_streak: 0,
            rep_count: 0,
            current_rep: None,
        })
    }

    /// Configuration governing the current frame: the rep snapshot while a
    /// rep is in progress, the live configuration otherwise.
    fn active_config(&self) -> &PhaseConfig {
        self.rep_config.as_ref().unwrap_or(&self.config)
    }

    pub fn update(&mut self, sample: &NormalizedSample) -> ClassifierOutput {
        if !sample.calibrated {
            // Hold position until torso length is known
            return ClassifierOutput {
                phase: self.phase,
                zone: None,
                events: Vec::new(),
            };
        }

        let cfg = self.active_config().clone();
        let zone = Zone::classify(sample, &cfg);

        if sample.velocity_x.abs() < cfg.stable_velocity
            && sample.velocity_y.abs() < cfg.stable_velocity
        {
            self.stable_streak = self.stable_streak.saturating_add(1);
        } else {
            self.stable_streak = 0;
        }
        self.frames_in_phase = self.frames_in_phase.saturating_add(1);

        let mut events = Vec::new();
        match self.candidate(zone, sample, &cfg) {
            Some(target) => {
                let held = match self.pending {
                    Some((p, n)) if p == target => n + 1,
                    _ => 1,
                };
                self.pending = Some((target, held));

                if self.frames_in_phase >= cfg.min_frames_in_phase
                    && held >= cfg.min_frames_in_phase
                {
                    events = self.transition(target, sample, zone);
                }
            }
            None => self.pending = None,
        }

        if matches!(self.phase, Phase::Drive | Phase::Float) {
            if let Some(rep) = self.current_rep.as_mut() {
                rep.track(sample);
            }
        }

        ClassifierOutput {
            phase: self.phase,
            zone: Some(zone),
            events,
        }
    }

    fn candidate(&self, zone: Zone, sample: &NormalizedSample, cfg: &PhaseConfig) -> Option<Phase> {
        let stable = self.stable_streak > cfg.stable_frames;
        match self.phase {
            Phase::Ready => (zone == Zone::LowBehind).then_some(Phase::Hike),
            Phase::Hike => (sample.velocity_y > cfg.min_drive_velocity).then_some(Phase::Drive),
            Phase::Drive => {
                if zone == Zone::High {
                    Some(Phase::Float)
                } else if sample.velocity_y < cfg.min_drop_velocity {
                    // Float skipped (low swing)
                    Some(Phase::Drop)
                } else {
                    None
                }
            }
            Phase::Float => (sample.velocity_y < cfg.min_drop_velocity).then_some(Phase::Drop),
            Phase::Drop => {
                if zone == Zone::LowBehind {
                    Some(Phase::Hike)
                } else if zone == Zone::LowForward && stable {
                    Some(Phase::Park)
                } else {
                    None
                }
            }
            Phase::Park => stable.then_some(Phase::Ready),
        }
    }

    fn transition(
        &mut self,
        target: Phase,
        sample: &NormalizedSample,
        zone: Zone,
    ) -> Vec<PhaseEvent> {
        let from = self.phase;
        let mut events = Vec::with_capacity(2);

        match (from, target) {
            (Phase::Ready, Phase::Hike) => self.start_rep(sample),
            (Phase::Hike, Phase::Drive) => {
                if let Some(rep) = self.current_rep.as_mut() {
                    rep.drive_start_time = Some(sample.timestamp);
                }
            }
            (Phase::Drop, Phase::Hike) => {
                if let Some(done) = self.complete_rep(sample.timestamp) {
                    events.push(PhaseEvent::RepCompleted(done));
                }
                self.start_rep(sample);
            }
            (Phase::Drop, Phase::Park) => {
                if let Some(done) = self.complete_rep(sample.timestamp) {
                    events.push(PhaseEvent::RepCompleted(done));
                }
                self.rep_config = None;
            }
            _ => {}
        }

        debug!(
            "Phase {} → {} at {:.3}s in {} (reps={})",
            from.as_str(),
            target.as_str(),
            sample.timestamp,
            zone.as_str(),
            self.rep_count
        );

        self.phase = target;
        self.frames_in_phase = 0;
        self.pending = None;
        events.push(PhaseEvent::PhaseChanged {
            from,
            to: target,
            rep_count: self.rep_count,
            timestamp: sample.timestamp,
        });
        events
    }

    fn start_rep(&mut self, sample: &NormalizedSample) {
        self.rep_config = Some(self.config.clone());
        self.current_rep = Some(RawRep::start(sample.timestamp, sample.relative_height));
    }

    fn complete_rep(&mut self, end_time: f64) -> Option<CompletedRep> {
        let rep = self.current_rep.take()?;
        self.rep_count += 1;
        Some(rep.finish(end_time))
    }

    /// Replace the live thresholds. A rep in progress keeps its snapshot.
    pub fn reconfigure(&mut self, config: PhaseConfig) -> Result<(), ConfigError> {
        config.validate()?;
        debug!(
            "Phase config updated{}",
            if self.rep_config.is_some() {
                " (applies from next rep)"
            } else {
                ""
            }
        );
        self.config = config;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.rep_config = None;
        self.phase = Phase::Ready;
        self.frames_in_phase = 0;
        self.pending = None;
        self.stable_streak = 0;
        self.rep_count = 0;
        self.current_rep = None;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rep_count(&self) -> usize {
        self.rep_count
    }

    pub fn stable_streak(&self) -> u32 {
        self.stable_streak
    }

    pub fn current_rep(&self) -> Option<&RawRep> {
        self.current_rep.as_ref()
    }

    pub fn config(&self) -> &PhaseConfig {
        &self.config
    }
}
