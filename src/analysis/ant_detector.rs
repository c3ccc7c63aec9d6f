// src/analysis/ant_detector.rs
//
// Anaerobic threshold detection over the valid-rep speed series.
//
// The first `baseline_reps` valid peak speeds set a baseline that is then
// frozen. Every later rep gets a trailing-mean speed (never reaching back into
// the baseline window) which is compared against baseline × (1 − drop).
// ANT is the first run of `sustain_count` consecutive below-threshold reps and
// latches once found.

use crate::config::{AntConfig, ConfigError};
use crate::types::{AntResult, RepMetric};
use tracing::{debug, info};

pub struct AntDetector {
    config: AntConfig,

    speeds: Vec<f64>,
    start_times: Vec<f64>,
    smoothed: Vec<Option<f64>>,
    below: Vec<bool>,

    /// Frozen baseline and the number of reps it was computed from
    baseline: Option<(f64, usize)>,
    below_run: usize,
    result: AntResult,
}

impl AntDetector {
    pub fn new(config: AntConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            speeds: Vec::new(),
            start_times: Vec::new(),
            smoothed: Vec::new(),
            below: Vec::new(),
            baseline: None,
            below_run: 0,
            result: AntResult::default(),
        })
    }

    /// Feed the next valid rep. Invalid reps are ignored.
    pub fn on_valid_rep(&mut self, metric: &RepMetric) -> AntResult {
        if !metric.is_valid {
            debug!("ANT detector ignoring invalid rep #{}", metric.sequence);
            return self.result.clone();
        }

        self.speeds.push(metric.peak_speed);
        self.start_times.push(metric.start_time);
        let i = self.speeds.len() - 1;

        // `>=`: a reconfigure may lower baseline_reps below the reps already seen
        if self.baseline.is_none() && self.speeds.len() >= self.config.baseline_reps {
            let n = self.config.baseline_reps;
            let mean = self.speeds[..n].iter().sum::<f64>() / n as f64;
            self.baseline = Some((mean, n));
            info!("🧊 Baseline frozen at {:.3} over {} reps", mean, n);
        }

        let smoothed = match self.baseline {
            Some((_, len)) if i >= len => {
                let from = (i + 1).saturating_sub(self.config.smoothing_window).max(len);
                let window = &self.speeds[from..=i];
                Some(window.iter().sum::<f64>() / window.len() as f64)
            }
            _ => None,
        };
        let is_below = match (smoothed, self.threshold_speed()) {
            (Some(s), Some(threshold)) => s < threshold,
            _ => false,
        };
        self.smoothed.push(smoothed);
        self.below.push(is_below);

        self.below_run = if is_below { self.below_run + 1 } else { 0 };
        if !self.result.ant_reached && self.below_run >= self.config.sustain_count {
            self.latch(i + 1 - self.config.sustain_count);
        }

        self.result.clone()
    }

    fn latch(&mut self, ant_index: usize) {
        let (baseline, _) = match self.baseline {
            Some(b) => b,
            None => return,
        };
        let smoothed = match self.smoothed.get(ant_index).copied().flatten() {
            Some(s) => s,
            None => return,
        };
        let drop = (baseline - smoothed) / baseline;

        self.result = AntResult {
            ant_reached: true,
            ant_rep_index: Some(ant_index),
            ant_timestamp: self.start_times.get(ant_index).copied(),
            drop_percent_at_ant: Some(drop),
        };
        info!(
            "🔥 ANT reached at rep {} ({:.1}% below baseline)",
            ant_index + 1,
            drop * 100.0
        );
    }

    /// Bulk form: replay `reps` through `on_valid_rep` in order.
    pub fn evaluate(&mut self, reps: &[RepMetric]) -> AntResult {
        for rep in reps {
            self.on_valid_rep(rep);
        }
        self.result.clone()
    }

    pub fn baseline_speed(&self) -> Option<f64> {
        self.baseline.map(|(b, _)| b)
    }

    pub fn baseline_reps_used(&self) -> usize {
        self.baseline.map(|(_, n)| n).unwrap_or(0)
    }

    /// `None` until a baseline exists, or when it is non-positive.
    pub fn threshold_speed(&self) -> Option<f64> {
        self.baseline_speed()
            .filter(|b| *b > 0.0)
            .map(|b| b * (1.0 - self.config.drop_threshold))
    }

    /// Per valid rep; `None` inside the baseline window.
    pub fn smoothed_speeds(&self) -> &[Option<f64>] {
        &self.smoothed
    }

    pub fn below_flags(&self) -> &[bool] {
        &self.below
    }

    pub fn result(&self) -> &AntResult {
        &self.result
    }

    /// New parameters apply to reps arriving after this call. A frozen
    /// baseline and a latched result are kept.
    pub fn reconfigure(&mut self, config: AntConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.speeds.clear();
        self.start_times.clear();
        self.smoothed.clear();
        self.below.clear();
        self.baseline = None;
        self.below_run = 0;
        self.result = AntResult::default();
    }
}
