// src/landmark_source.rs
//
// Pose captures on disk: one JSON LandmarkFrame per line (.jsonl / .ndjson).

use crate::config::CaptureConfig;
use crate::types::{CaptureInfo, LandmarkFrame};
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

pub struct LandmarkSource {
    config: CaptureConfig,
}

/// A capture decimated to roughly the target rate.
#[derive(Debug, Clone)]
pub struct SampledCapture {
    pub frames: Vec<LandmarkFrame>,
    pub info: CaptureInfo,
    pub native_fps: f64,
    pub frame_skip: usize,
    pub total_frames: usize,
}

impl LandmarkSource {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    pub fn find_capture_files(&self) -> Result<Vec<PathBuf>> {
        let mut captures = Vec::new();

        let extensions = ["jsonl", "ndjson", "JSONL", "NDJSON"];

        for entry in WalkDir::new(&self.config.input_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if let Some(ext) = path.extension() {
                if extensions.contains(&ext.to_str().unwrap_or("")) {
                    captures.push(path.to_path_buf());
                }
            }
        }
        captures.sort();

        info!("Found {} capture files", captures.len());
        Ok(captures)
    }

    /// Read, check, and sample one capture.
    pub fn open_capture(&self, path: &Path) -> Result<SampledCapture> {
        info!("Opening capture: {}", path.display());
        let frames = read_capture(path)?;
        self.sample(frames)
    }

    pub fn sample(&self, frames: Vec<LandmarkFrame>) -> Result<SampledCapture> {
        let total_frames = frames.len();
        let native_fps = match estimate_fps(&frames) {
            Some(fps) => fps,
            None => bail!(
                "Cannot determine frame rate from {} frames",
                total_frames
            ),
        };

        let duration = total_frames as f64 / native_fps;
        if duration < self.config.min_duration_secs {
            bail!(
                "Capture too short: {:.1}s (minimum {:.1}s)",
                duration,
                self.config.min_duration_secs
            );
        }

        let skip = frame_skip(native_fps, self.config.target_fps);
        let frames: Vec<LandmarkFrame> = frames.into_iter().step_by(skip).collect();
        let fps_used = native_fps / skip as f64;

        info!(
            "Capture properties: {} frames @ {:.1} FPS, {:.1}s, sampling every {} → {:.1} FPS",
            total_frames, native_fps, duration, skip, fps_used
        );

        Ok(SampledCapture {
            frames,
            info: CaptureInfo {
                fps_used,
                video_duration_seconds: duration,
            },
            native_fps,
            frame_skip: skip,
            total_frames,
        })
    }

    /// `<output_dir>/<stem>_analysis.json`
    pub fn report_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("capture");
        PathBuf::from(&self.config.output_dir).join(format!("{}_analysis.json", stem))
    }
}

pub fn read_capture(path: &Path) -> Result<Vec<LandmarkFrame>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open capture {}", path.display()))?;
    parse_capture(BufReader::new(file))
        .with_context(|| format!("Failed to parse capture {}", path.display()))
}

/// Parse JSON Lines; blank lines are skipped.
pub fn parse_capture<R: BufRead>(reader: R) -> Result<Vec<LandmarkFrame>> {
    let mut frames = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let frame: LandmarkFrame = serde_json::from_str(trimmed)
            .with_context(|| format!("Malformed frame on line {}", i + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

/// Mean frame rate over the capture's timestamp span.
pub fn estimate_fps(frames: &[LandmarkFrame]) -> Option<f64> {
    let first = frames.first()?.timestamp;
    let last = frames.last()?.timestamp;
    let span = last - first;
    if frames.len() < 2 || span.is_nan() || span <= 0.0 {
        return None;
    }
    Some((frames.len() - 1) as f64 / span)
}

/// Slack for timestamp rounding: a 30 fps estimate of 29.9999999 still
/// halves to 15 fps.
const RATIO_EPSILON: f64 = 1e-6;

pub fn frame_skip(native_fps: f64, target_fps: f64) -> usize {
    if target_fps > 0.0 && target_fps < native_fps {
        ((native_fps / target_fps + RATIO_EPSILON).floor() as usize).max(1)
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic;

    fn source(min_duration_secs: f64) -> LandmarkSource {
        LandmarkSource::new(CaptureConfig {
            min_duration_secs,
            ..Default::default()
        })
    }

    fn frames_at(fps: f64, count: usize) -> Vec<LandmarkFrame> {
        (0..count)
            .map(|i| synthetic::frame(i as f64 / fps, -0.5, 0.5))
            .collect()
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let a = serde_json::to_string(&synthetic::frame(0.0, 0.0, 0.0)).unwrap();
        let b = serde_json::to_string(&synthetic::frame(0.1, 0.0, 0.0)).unwrap();
        let text = format!("{}\n\n{}\n   \n", a, b);
        let frames = parse_capture(text.as_bytes()).unwrap();
        assert_eq!(frames.len(), 2);
        assert!((frames[1].timestamp - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let a = serde_json::to_string(&synthetic::frame(0.0, 0.0, 0.0)).unwrap();
        let text = format!("{}\n{}\n{{not json\n", a, a);
        let err = parse_capture(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"), "got: {}", err);
    }

    #[test]
    fn test_frame_skip() {
        assert_eq!(frame_skip(30.0, 15.0), 2);
        assert_eq!(frame_skip(60.0, 15.0), 4);
        assert_eq!(frame_skip(25.0, 15.0), 1);
        assert_eq!(frame_skip(10.0, 15.0), 1);
    }

    #[test]
    fn test_frame_skip_tolerates_accumulated_timestamps() {
        // Timestamps built by repeated addition drift just under 30 fps
        let mut t = 0.0;
        let frames: Vec<_> = (0..555)
            .map(|_| {
                let f = synthetic::frame(t, -0.5, 0.5);
                t += 1.0 / 30.0;
                f
            })
            .collect();
        let fps = estimate_fps(&frames).unwrap();
        assert!((fps - 30.0).abs() < 1e-6);
        assert_eq!(frame_skip(fps, 15.0), 2);
        assert_eq!(frame_skip(29.999_999_999_9, 15.0), 2);
        assert_eq!(frame_skip(29.9, 15.0), 1);
    }

    #[test]
    fn test_sampling_halves_thirty_fps() {
        let s = source(5.0).sample(frames_at(30.0, 301)).unwrap();
        assert_eq!(s.frame_skip, 2);
        assert_eq!(s.frames.len(), 151);
        assert!((s.native_fps - 30.0).abs() < 1e-6);
        assert!((s.info.fps_used - 15.0).abs() < 1e-6);
        assert!((s.info.video_duration_seconds - 301.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_short_capture_rejected() {
        let err = source(5.0).sample(frames_at(30.0, 60)).unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_single_frame_has_no_rate() {
        assert!(estimate_fps(&frames_at(30.0, 1)).is_none());
        assert!(source(0.0).sample(frames_at(30.0, 1)).is_err());
    }

    #[test]
    fn test_finds_capture_files() {
        let dir = std::env::temp_dir().join(format!("kb_threshold_find_{}", std::process::id()));
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("a.jsonl"), "").unwrap();
        std::fs::write(dir.join("nested").join("b.ndjson"), "").unwrap();
        std::fs::write(dir.join("notes.txt"), "").unwrap();

        let src = LandmarkSource::new(CaptureConfig {
            input_dir: dir.to_string_lossy().into_owned(),
            ..Default::default()
        });
        let found = src.find_capture_files().unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.extension().is_some_and(|e| e != "txt")));
    }

    #[test]
    fn test_report_path_uses_stem() {
        let src = LandmarkSource::new(CaptureConfig {
            output_dir: "out".to_string(),
            ..Default::default()
        });
        assert_eq!(
            src.report_path(Path::new("captures/session_01.jsonl")),
            PathBuf::from("out").join("session_01_analysis.json")
        );
    }
}
