// src/pipeline/orchestrator.rs
//
// Wires normalizer → phase classifier → rep aggregator → ANT detector.
//
// Streaming callers feed one frame at a time through process_frame();
// run_batch() replays a pre-collected capture through the same call, so both
// drivers share one state machine.

use super::events::PipelineEvent;
use super::metrics::PipelineMetrics;
use crate::analysis::{
    AntDetector, Phase, PhaseClassifier, PhaseEvent, PositionNormalizer, RepMetricsAggregator,
    Zone,
};
use crate::config::{Config, ConfigError};
use crate::types::{
    AnalysisDiagnostics, AnalysisResult, CaptureInfo, LandmarkFrame, MovementType, RepMetric,
};
use tracing::{debug, info};

/// What happened on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub phase: Phase,
    /// `None` for inert or uncalibrated frames
    pub zone: Option<Zone>,
    pub events: Vec<PipelineEvent>,
}

pub struct ThresholdPipeline {
    config: Config,
    normalizer: PositionNormalizer,
    classifier: PhaseClassifier,
    aggregator: RepMetricsAggregator,
    ant: AntDetector,
    metrics: PipelineMetrics,
}

impl ThresholdPipeline {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let movement = config.capture.movement_type;

        let pipeline = Self {
            normalizer: PositionNormalizer::new(config.normalizer.clone(), movement)?,
            classifier: PhaseClassifier::new(config.phase.clone())?,
            aggregator: RepMetricsAggregator::new(config.reps.clone(), movement)?,
            ant: AntDetector::new(config.ant.clone())?,
            metrics: PipelineMetrics::new(),
            config,
        };

        info!("✓ Threshold pipeline initialized ({})", movement.as_str());
        Ok(pipeline)
    }

    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> FrameReport {
        self.metrics.frames_seen += 1;

        let sample = match self.normalizer.process(frame) {
            Some(s) => s,
            None => {
                self.metrics.frames_skipped += 1;
                return FrameReport {
                    phase: self.classifier.phase(),
                    zone: None,
                    events: Vec::new(),
                };
            }
        };
        self.metrics.frames_processed += 1;
        if !sample.calibrated {
            self.metrics.frames_uncalibrated += 1;
        }

        let output = self.classifier.update(&sample);
        let mut events = Vec::with_capacity(output.events.len() + 1);

        for event in output.events {
            match event {
                PhaseEvent::PhaseChanged {
                    from,
                    to,
                    rep_count,
                    timestamp,
                } => {
                    self.metrics.phase_transitions += 1;
                    events.push(PipelineEvent::PhaseChanged {
                        from,
                        to,
                        rep_count,
                        timestamp,
                    });
                }
                PhaseEvent::RepCompleted(rep) => {
                    self.metrics.reps_completed += 1;
                    let metric = self.aggregator.on_raw_rep(&rep);
                    self.handle_rep(metric, &mut events);
                }
            }
        }

        FrameReport {
            phase: output.phase,
            zone: output.zone,
            events,
        }
    }

    fn handle_rep(&mut self, mut metric: RepMetric, events: &mut Vec<PipelineEvent>) {
        if !metric.is_valid {
            self.metrics.invalid_reps += 1;
            events.push(PipelineEvent::RepCompleted(metric));
            return;
        }

        self.metrics.valid_reps += 1;
        let already_reached = self.ant.result().ant_reached;
        let result = self.ant.on_valid_rep(&metric);
        metric.is_below_threshold = self.ant.below_flags().last().copied().unwrap_or(false);

        events.push(PipelineEvent::RepCompleted(metric));
        if result.ant_reached && !already_reached {
            events.push(PipelineEvent::AntReached(result));
        }
    }

    /// Replay a whole capture. Equivalent to calling `process_frame` on each
    /// frame in order.
    pub fn run_batch(&mut self, frames: &[LandmarkFrame]) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        for frame in frames {
            events.extend(self.process_frame(frame).events);
        }
        debug!(
            "Batch of {} frames produced {} events",
            frames.len(),
            events.len()
        );
        events
    }

    /// Build the report for everything processed so far.
    pub fn result(&self, capture: &CaptureInfo) -> AnalysisResult {
        let below = self.ant.below_flags();
        let rep_metrics: Vec<RepMetric> = self
            .aggregator
            .valid_reps()
            .into_iter()
            .map(|mut rep| {
                rep.is_below_threshold = rep
                    .rep_index
                    .and_then(|i| below.get(i).copied())
                    .unwrap_or(false);
                rep
            })
            .collect();

        let ant = self.ant.result();
        AnalysisResult {
            movement_type: self.movement(),
            total_valid_reps: rep_metrics.len(),
            video_duration_seconds: capture.video_duration_seconds,
            baseline_speed: self.ant.baseline_speed(),
            ant_reached: ant.ant_reached,
            ant_rep_index: ant.ant_rep_index,
            ant_timestamp_seconds: ant.ant_timestamp,
            drop_percent_at_ant: ant.drop_percent_at_ant,
            rep_metrics,
            diagnostics: AnalysisDiagnostics {
                fps_used: capture.fps_used,
                frames_sampled: self.metrics.frames_seen,
                frames_skipped: self.metrics.frames_skipped,
                invalid_reps_filtered: self.aggregator.invalid_count(),
                baseline_reps_used: self.ant.baseline_reps_used(),
                threshold_speed: self.ant.threshold_speed(),
            },
        }
    }

    /// Back to construction-time state, keeping the current configuration.
    pub fn reset(&mut self) {
        self.normalizer.reset();
        self.classifier.reset();
        self.aggregator.reset();
        self.ant.reset();
        self.metrics = PipelineMetrics::new();
        debug!("Pipeline reset");
    }

    /// Swap thresholds without discarding accumulated state. The movement
    /// type is fixed for the lifetime of the pipeline.
    pub fn reconfigure(&mut self, config: Config) -> Result<(), ConfigError> {
        config.validate()?;
        if config.capture.movement_type != self.movement() {
            return Err(ConfigError::Inconsistent(format!(
                "movement type cannot change from {} to {} without a new pipeline",
                self.movement().as_str(),
                config.capture.movement_type.as_str()
            )));
        }

        self.normalizer.reconfigure(config.normalizer.clone())?;
        self.classifier.reconfigure(config.phase.clone())?;
        self.aggregator.reconfigure(config.reps.clone())?;
        self.ant.reconfigure(config.ant.clone())?;
        self.config = config;
        info!("✓ Pipeline reconfigured");
        Ok(())
    }

    pub fn movement(&self) -> MovementType {
        self.config.capture.movement_type
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.classifier.phase()
    }

    pub fn rep_count(&self) -> usize {
        self.classifier.rep_count()
    }

    pub fn torso_length(&self) -> Option<f64> {
        self.normalizer.torso_length()
    }

    pub fn ant(&self) -> &AntDetector {
        &self.ant
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }
}
