// src/integration_tests.rs
//
// End-to-end scenarios over synthetic swing sessions.

use crate::config::Config;
use crate::landmark_source::{parse_capture, LandmarkSource};
use crate::pipeline::{PipelineEvent, ThresholdPipeline};
use crate::synthetic;
use crate::types::{AnalysisResult, CaptureInfo, LandmarkFrame};

fn capture_info(frames: &[LandmarkFrame]) -> CaptureInfo {
    CaptureInfo {
        fps_used: synthetic::FPS,
        video_duration_seconds: frames.len() as f64 / synthetic::FPS,
    }
}

fn analyse(frames: &[LandmarkFrame]) -> AnalysisResult {
    let mut pipeline = ThresholdPipeline::new(Config::default()).unwrap();
    pipeline.run_batch(frames);
    pipeline.result(&capture_info(frames))
}

fn fatigue_session() -> Vec<LandmarkFrame> {
    let mut factors = vec![1.0; 5];
    factors.extend([0.6; 5]);
    synthetic::swing_session(&factors)
}

#[test]
fn test_steady_session_has_no_threshold() {
    let frames = synthetic::swing_session(&[1.0; 10]);
    let result = analyse(&frames);

    assert_eq!(result.total_valid_reps, 10);
    assert!(!result.ant_reached);
    assert_eq!(result.ant_rep_index, None);
    assert_eq!(result.drop_percent_at_ant, None);
    assert!(result.rep_metrics.iter().all(|r| !r.is_below_threshold));

    let first = result.rep_metrics[0].peak_speed;
    let baseline = result.baseline_speed.unwrap();
    assert!((baseline - first).abs() / first < 0.01, "identical swings set the baseline");
}

#[test]
fn test_fatigue_session_reaches_threshold() {
    let frames = fatigue_session();
    let result = analyse(&frames);

    assert_eq!(result.total_valid_reps, 10);
    assert!(result.ant_reached);
    assert_eq!(result.ant_rep_index, Some(5), "first slow rep starts the run");

    let drop = result.drop_percent_at_ant.unwrap();
    assert!(drop >= 0.20, "drop {} below configured threshold", drop);
    assert!(drop < 0.6, "drop {} larger than the slowdown", drop);

    let ant_rep = &result.rep_metrics[5];
    assert_eq!(result.ant_timestamp_seconds, Some(ant_rep.start_time));
    assert!(ant_rep.is_below_threshold);
    assert!(result.rep_metrics[..5].iter().all(|r| !r.is_below_threshold));
    assert!(result.diagnostics.threshold_speed.is_some());
    assert!(result.meets_minimum(10));
}

#[test]
fn test_batch_matches_streaming() {
    let frames = fatigue_session();

    let mut batch = ThresholdPipeline::new(Config::default()).unwrap();
    let batch_events = batch.run_batch(&frames);

    let mut streaming = ThresholdPipeline::new(Config::default()).unwrap();
    let mut streaming_events = Vec::new();
    for frame in &frames {
        streaming_events.extend(streaming.process_frame(frame).events);
    }

    assert_eq!(batch_events, streaming_events);
    let info = capture_info(&frames);
    let a = serde_json::to_value(batch.result(&info)).unwrap();
    let b = serde_json::to_value(streaming.result(&info)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_reset_matches_fresh_instance() {
    let frames = fatigue_session();
    let info = capture_info(&frames);

    let mut reused = ThresholdPipeline::new(Config::default()).unwrap();
    reused.run_batch(&synthetic::swing_session(&[1.0, 0.7, 0.5]));
    reused.reset();
    let reused_events = reused.run_batch(&frames);

    let mut fresh = ThresholdPipeline::new(Config::default()).unwrap();
    let fresh_events = fresh.run_batch(&frames);

    assert_eq!(reused_events, fresh_events);
    assert_eq!(
        serde_json::to_value(reused.result(&info)).unwrap(),
        serde_json::to_value(fresh.result(&info)).unwrap()
    );
}

#[test]
fn test_ant_event_emitted_once() {
    let frames = fatigue_session();
    let mut pipeline = ThresholdPipeline::new(Config::default()).unwrap();
    let events = pipeline.run_batch(&frames);

    let ant_events: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, PipelineEvent::AntReached(_)))
        .collect();
    assert_eq!(ant_events.len(), 1);

    // Reported on the rep that completed the run, right after it
    let pos = events
        .iter()
        .position(|e| matches!(e, PipelineEvent::AntReached(_)))
        .unwrap();
    match &events[pos - 1] {
        PipelineEvent::RepCompleted(m) => assert_eq!(m.rep_index, Some(6)),
        other => panic!("expected RepCompleted before AntReached, got {:?}", other),
    }
}

#[test]
fn test_inert_frames_do_not_change_analysis() {
    let frames = fatigue_session();
    let mut with_gaps = Vec::with_capacity(frames.len() * 2);
    for (i, frame) in frames.iter().enumerate() {
        with_gaps.push(frame.clone());
        if i % 7 == 3 {
            with_gaps.push(synthetic::inert_frame(frame.timestamp + 0.001));
        }
    }

    let clean = analyse(&frames);
    let mut pipeline = ThresholdPipeline::new(Config::default()).unwrap();
    pipeline.run_batch(&with_gaps);
    let gappy = pipeline.result(&capture_info(&frames));

    assert_eq!(clean.rep_metrics, gappy.rep_metrics);
    assert_eq!(clean.ant_rep_index, gappy.ant_rep_index);
    assert!(gappy.diagnostics.frames_skipped > 0);
}

#[test]
fn test_strict_validation_filters_reps() {
    let frames = synthetic::swing_session(&[1.0; 6]);
    let mut config = Config::default();
    // Every synthetic rep lasts over a second
    config.reps.max_rep_duration = 1.0;
    config.reps.min_rep_duration = 0.2;

    let mut pipeline = ThresholdPipeline::new(config).unwrap();
    let events = pipeline.run_batch(&frames);
    let result = pipeline.result(&capture_info(&frames));

    let completed = events
        .iter()
        .filter(|e| matches!(e, PipelineEvent::RepCompleted(_)))
        .count();
    assert_eq!(completed, 6);
    assert_eq!(result.total_valid_reps, 0);
    assert!(result.rep_metrics.is_empty());
    assert_eq!(result.diagnostics.invalid_reps_filtered, 6);
    assert_eq!(result.baseline_speed, None);
    assert!(!result.ant_reached);
}

#[test]
fn test_capture_file_round_trip_through_source() {
    let frames = fatigue_session();
    let text: String = frames
        .iter()
        .map(|f| serde_json::to_string(f).unwrap() + "\n")
        .collect();

    let parsed = parse_capture(text.as_bytes()).unwrap();
    let source = LandmarkSource::new(Config::default().capture);
    let sampled = source.sample(parsed).unwrap();
    // 30 fps capture decimated to 15 fps
    assert_eq!(sampled.frame_skip, 2);

    let mut pipeline = ThresholdPipeline::new(Config::default()).unwrap();
    pipeline.run_batch(&sampled.frames);
    let result = pipeline.result(&sampled.info);

    assert_eq!(result.total_valid_reps, 10);
    assert!(result.ant_reached);
    assert!((result.diagnostics.fps_used - 15.0).abs() < 0.1);
}
