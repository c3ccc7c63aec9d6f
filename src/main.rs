// src/main.rs

use anyhow::{Context, Result};
use kb_threshold::config::Config;
use kb_threshold::landmark_source::LandmarkSource;
use kb_threshold::pipeline::ThresholdPipeline;
use kb_threshold::types::AnalysisResult;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kb_threshold=info".into()),
        )
        .init();

    info!("🏋 Kettlebell Threshold Analysis Starting");

    let config_path =
        std::env::var("KB_THRESHOLD_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = Config::load(&config_path)?;
    info!("✓ Configuration loaded from {}", config_path);

    info!(
        "Phase thresholds: float={:.2}, drive={:.2}, drop={:.2}, debounce={} frames",
        config.phase.float_threshold,
        config.phase.min_drive_velocity,
        config.phase.min_drop_velocity,
        config.phase.min_frames_in_phase
    );
    info!(
        "ANT: baseline={} reps, drop={:.0}%, window={}, sustain={}",
        config.ant.baseline_reps,
        config.ant.drop_threshold * 100.0,
        config.ant.smoothing_window,
        config.ant.sustain_count
    );

    let source = LandmarkSource::new(config.capture.clone());
    let captures = source.find_capture_files()?;

    if captures.is_empty() {
        error!("No capture files found in {}", config.capture.input_dir);
        return Ok(());
    }

    fs::create_dir_all(&config.capture.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.capture.output_dir
        )
    })?;

    for (idx, path) in captures.iter().enumerate() {
        info!("========================================");
        info!(
            "Processing capture {}/{}: {}",
            idx + 1,
            captures.len(),
            path.display()
        );

        match process_capture(path, &source, &config) {
            Ok(result) => log_summary(&result, config.capture.min_valid_reps),
            Err(e) => error!("Failed to process {}: {:#}", path.display(), e),
        }
    }

    info!("✓ All captures processed");
    Ok(())
}

fn process_capture(path: &Path, source: &LandmarkSource, config: &Config) -> Result<AnalysisResult> {
    let capture = source.open_capture(path)?;

    let mut pipeline = ThresholdPipeline::new(config.clone())?;
    pipeline.run_batch(&capture.frames);
    let result = pipeline.result(&capture.info);

    let metrics = pipeline.metrics().summary();
    info!(
        "  Frames: {} sampled, {} skipped, {} uncalibrated ({:.0} frames/s)",
        metrics.frames_seen, metrics.frames_skipped, metrics.frames_uncalibrated, metrics.fps
    );

    let report_path = source.report_path(path);
    let json = serde_json::to_string_pretty(&result)?;
    fs::write(&report_path, json)
        .with_context(|| format!("Failed to write report {}", report_path.display()))?;
    info!("  Report: {}", report_path.display());

    Ok(result)
}

fn log_summary(result: &AnalysisResult, min_valid_reps: usize) {
    info!("✓ Capture analysed ({:.1}s)", result.video_duration_seconds);
    info!(
        "  Valid reps: {} ({} rejected)",
        result.total_valid_reps, result.diagnostics.invalid_reps_filtered
    );

    if !result.meets_minimum(min_valid_reps) {
        warn!(
            "  Only {} valid reps; at least {} are needed for a reliable threshold",
            result.total_valid_reps, min_valid_reps
        );
    }

    match result.baseline_speed {
        Some(b) => info!("  Baseline speed: {:.3} torso/s", b),
        None => info!("  Baseline speed: not established"),
    }

    if result.ant_reached {
        info!(
            "  🔥 ANT at rep {} ({:.1}s, {:.1}% below baseline)",
            result.ant_rep_index.map(|i| i + 1).unwrap_or(0),
            result.ant_timestamp_seconds.unwrap_or(0.0),
            result.drop_percent_at_ant.unwrap_or(0.0) * 100.0
        );
    } else {
        info!("  ANT not reached");
    }
}
