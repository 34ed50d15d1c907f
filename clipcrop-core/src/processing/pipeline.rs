//! Per-clip pipeline: parse, skip checks, probe, resolve, transform.
//!
//! Every item ends in exactly one [`ClipOutcome`]. Errors are values here;
//! nothing that goes wrong with one clip escapes as an `Err`. Panics are
//! caught one level up, by the batch worker.

use crate::config::BatchConfig;
use crate::descriptor::{ClipSpec, DescriptorLine};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, FfprobeExecutor};
use crate::processing::resolve::resolve;
use crate::processing::transform::{TransformRequest, plan_transform, run_transform};

use log::{error, info, warn};

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Why a clip was not processed. Skips are expected and not failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// `<input_dir>/<video_name>.mp4` does not exist
    MissingSource(PathBuf),
    /// The deterministic output file already exists
    AlreadyProcessed(PathBuf),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingSource(path) => {
                write!(f, "input file {} does not exist", path.display())
            }
            SkipReason::AlreadyProcessed(path) => {
                write!(f, "output file {} exists", path.display())
            }
        }
    }
}

/// Terminal state of one clip.
#[derive(Debug)]
pub enum ClipOutcome {
    Skipped(SkipReason),
    Succeeded {
        output_path: PathBuf,
        output_size: u64,
        elapsed: Duration,
    },
    /// Dry run: the command that would have been executed.
    Planned {
        output_path: PathBuf,
        command: String,
    },
    Failed(CoreError),
    /// Never started because the batch was interrupted.
    Cancelled,
}

impl ClipOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, ClipOutcome::Failed(_))
    }
}

/// The outcome of one descriptor line, with what identifies it in logs.
#[derive(Debug)]
pub struct ClipReport {
    pub line_number: usize,
    pub descriptor: String,
    /// Set once the line parsed
    pub video_name: Option<String>,
    pub outcome: ClipOutcome,
}

impl ClipReport {
    /// Human-readable identifier: the video name when known, else the raw line.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.video_name {
            Some(name) => format!("line {} ({name})", self.line_number),
            None => format!("line {} ('{}')", self.line_number, self.descriptor),
        }
    }
}

/// Report for an item that was never dispatched.
#[must_use]
pub fn cancelled_report(line: &DescriptorLine) -> ClipReport {
    ClipReport {
        line_number: line.line_number,
        descriptor: line.text.clone(),
        video_name: None,
        outcome: ClipOutcome::Cancelled,
    }
}

/// Runs the full pipeline for one descriptor line.
pub fn process_clip<S: FfmpegSpawner, P: FfprobeExecutor>(
    config: &BatchConfig,
    spawner: &S,
    prober: &P,
    line: &DescriptorLine,
) -> ClipReport {
    let mut report = ClipReport {
        line_number: line.line_number,
        descriptor: line.text.clone(),
        video_name: None,
        outcome: ClipOutcome::Cancelled,
    };

    let spec = match ClipSpec::parse(&line.text) {
        Ok(spec) => spec,
        Err(e) => {
            report.outcome = ClipOutcome::Failed(e.into());
            log_outcome(&report);
            return report;
        }
    };
    report.video_name = Some(spec.video_name.clone());

    report.outcome = match run_stages(config, spawner, prober, &spec) {
        Ok(outcome) => outcome,
        Err(e) => ClipOutcome::Failed(e),
    };
    log_outcome(&report);
    report
}

fn run_stages<S: FfmpegSpawner, P: FfprobeExecutor>(
    config: &BatchConfig,
    spawner: &S,
    prober: &P,
    spec: &ClipSpec,
) -> CoreResult<ClipOutcome> {
    let output_path = spec.output_path(&config.output_dir);
    if output_path.exists() {
        return Ok(ClipOutcome::Skipped(SkipReason::AlreadyProcessed(output_path)));
    }

    let input_path = spec.source_path(&config.input_dir);
    if !input_path.exists() {
        return Ok(ClipOutcome::Skipped(SkipReason::MissingSource(input_path)));
    }

    let intrinsics = prober.probe(&input_path)?;
    let window = resolve(spec, &intrinsics, config.even_crop)?;
    log::debug!(
        "{}: source {}x{} @ {} fps, crop {}x{}+{}+{}, {:.3}s-{:.3}s",
        spec.video_name,
        intrinsics.width,
        intrinsics.height,
        intrinsics.frame_rate,
        window.crop.width(),
        window.crop.height(),
        window.crop.left,
        window.crop.top,
        window.start_secs(),
        window.end_secs()
    );

    let request = TransformRequest {
        input_path: &input_path,
        output_path: &output_path,
        window: &window,
        sample_rate: config.sample_rate,
    };

    if config.dry_run {
        return Ok(ClipOutcome::Planned {
            command: plan_transform(&request),
            output_path,
        });
    }

    let start = Instant::now();
    run_transform(spawner, &request)?;
    let output_size = match std::fs::metadata(&output_path) {
        Ok(metadata) => metadata.len(),
        Err(e) => {
            warn!("{}: encode finished but {} cannot be read: {e}", spec.video_name, output_path.display());
            0
        }
    };

    Ok(ClipOutcome::Succeeded {
        output_path,
        output_size,
        elapsed: start.elapsed(),
    })
}

fn log_outcome(report: &ClipReport) {
    match &report.outcome {
        ClipOutcome::Skipped(reason) => warn!("Skipping {}: {reason}", report.label()),
        ClipOutcome::Succeeded { output_path, .. } => {
            info!("Finished {} -> {}", report.label(), output_path.display());
        }
        ClipOutcome::Planned { command, .. } => info!("Planned {}: {command}", report.label()),
        ClipOutcome::Failed(e) => {
            error!("Failed to process {} at {} stage: {e}", report.label(), e.stage());
        }
        ClipOutcome::Cancelled => info!("Not started {}: batch interrupted", report.label()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{MockFfmpegSpawner, MockFfprobeExecutor, MockOutcome};
    use crate::media::{FrameRate, MediaIntrinsics};
    use std::fs;

    fn intrinsics() -> MediaIntrinsics {
        MediaIntrinsics {
            width: 640,
            height: 360,
            frame_rate: FrameRate::new(30, 1).unwrap(),
        }
    }

    fn line(text: &str) -> DescriptorLine {
        DescriptorLine { line_number: 1, text: text.to_string() }
    }

    fn setup() -> (tempfile::TempDir, BatchConfig) {
        let dir = tempfile::tempdir().unwrap();
        let input_dir = dir.path().join("videos");
        let output_dir = dir.path().join("clips");
        fs::create_dir_all(&input_dir).unwrap();
        fs::create_dir_all(&output_dir).unwrap();
        fs::write(input_dir.join("abc.mp4"), b"source").unwrap();
        let config = BatchConfig::new(dir.path().join("clips.txt"), input_dir, output_dir);
        (dir, config)
    }

    #[test]
    fn test_parse_failure_is_a_failed_outcome() {
        let (_dir, config) = setup();
        let report = process_clip(&config, &MockFfmpegSpawner::new(), &MockFfprobeExecutor::new(), &line("abc,1,2"));
        assert!(matches!(report.outcome, ClipOutcome::Failed(CoreError::Parse(_))));
        assert!(report.video_name.is_none());
        assert_eq!(report.label(), "line 1 ('abc,1,2')");
    }

    #[test]
    fn test_existing_output_skips_before_probing() {
        let (_dir, config) = setup();
        let text = "abc,360,640,0,29,0,0,320,180";
        let spec = ClipSpec::parse(text).unwrap();
        fs::write(spec.output_path(&config.output_dir), b"done").unwrap();

        let prober = MockFfprobeExecutor::with_default(intrinsics());
        let spawner = MockFfmpegSpawner::new();
        let report = process_clip(&config, &spawner, &prober, &line(text));

        assert!(matches!(report.outcome, ClipOutcome::Skipped(SkipReason::AlreadyProcessed(_))));
        assert_eq!(prober.call_count(), 0);
        assert_eq!(spawner.call_count(), 0);
    }

    #[test]
    fn test_missing_source_skips() {
        let (_dir, config) = setup();
        let prober = MockFfprobeExecutor::with_default(intrinsics());
        let report = process_clip(&config, &MockFfmpegSpawner::new(), &prober, &line("zzz,360,640,0,29,0,0,320,180"));
        assert!(matches!(report.outcome, ClipOutcome::Skipped(SkipReason::MissingSource(_))));
        assert_eq!(prober.call_count(), 0);
    }

    #[test]
    fn test_success_reports_output() {
        let (_dir, config) = setup();
        let prober = MockFfprobeExecutor::with_default(intrinsics());
        let spawner = MockFfmpegSpawner::new();
        let report = process_clip(&config, &spawner, &prober, &line("abc,360,640,0,29,0,0,320,180"));

        match report.outcome {
            ClipOutcome::Succeeded { output_path, output_size, .. } => {
                assert!(output_path.ends_with("abc_S0_E29_L0_T0_R320_B180.mp4"));
                assert!(output_path.exists());
                assert!(output_size > 0);
            }
            other => panic!("expected success, got {other:?}"),
        }
        let calls = spawner.get_received_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].iter().any(|a| a.contains("crop=320:180:0:0")));
    }

    #[test]
    fn test_probe_and_resolve_failures() {
        let (_dir, config) = setup();
        let prober = MockFfprobeExecutor::new();
        prober.expect_error(&config.input_dir.join("abc.mp4"), "moov atom not found");
        let report = process_clip(&config, &MockFfmpegSpawner::new(), &prober, &line("abc,360,640,0,29,0,0,320,180"));
        assert!(matches!(report.outcome, ClipOutcome::Failed(CoreError::Probe { .. })));

        // 1px-wide box at a quarter of the reference resolution
        let tiny = MediaIntrinsics { width: 160, height: 90, ..intrinsics() };
        let prober = MockFfprobeExecutor::with_default(tiny);
        let spawner = MockFfmpegSpawner::new();
        let report = process_clip(&config, &spawner, &prober, &line("abc,360,640,0,29,0,0,1,180"));
        assert!(matches!(report.outcome, ClipOutcome::Failed(CoreError::Resolve(_))));
        assert_eq!(spawner.call_count(), 0);
    }

    #[test]
    fn test_encode_failure_leaves_no_output() {
        let (_dir, config) = setup();
        let prober = MockFfprobeExecutor::with_default(intrinsics());
        let spawner = MockFfmpegSpawner::new();
        spawner.set_default_outcome(MockOutcome::ExitFailure { exit_code: 1, write_partial_output: true });

        let text = "abc,360,640,0,29,0,0,320,180";
        let report = process_clip(&config, &spawner, &prober, &line(text));

        assert!(matches!(report.outcome, ClipOutcome::Failed(CoreError::Encode { .. })));
        let output = ClipSpec::parse(text).unwrap().output_path(&config.output_dir);
        assert!(!output.exists());
    }

    #[test]
    fn test_unreadable_output_still_succeeds_with_zero_size() {
        let (_dir, config) = setup();
        let spawner = MockFfmpegSpawner::new();
        spawner.set_default_outcome(MockOutcome::SuccessWithoutOutput);
        let report = process_clip(
            &config,
            &spawner,
            &MockFfprobeExecutor::with_default(intrinsics()),
            &line("abc,360,640,0,29,0,0,320,180"),
        );
        match report.outcome {
            ClipOutcome::Succeeded { output_path, output_size, .. } => {
                assert!(!output_path.exists());
                assert_eq!(output_size, 0);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_dry_run_plans_without_spawning() {
        let (_dir, mut config) = setup();
        config.dry_run = true;
        let spawner = MockFfmpegSpawner::new();
        let report = process_clip(
            &config,
            &spawner,
            &MockFfprobeExecutor::with_default(intrinsics()),
            &line("abc,360,640,0,29,0,0,320,180"),
        );
        match report.outcome {
            ClipOutcome::Planned { command, output_path } => {
                assert!(command.contains("libx264"));
                assert!(!output_path.exists());
            }
            other => panic!("expected plan, got {other:?}"),
        }
        assert_eq!(spawner.call_count(), 0);
    }
}
