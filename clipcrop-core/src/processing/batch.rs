// ============================================================================
// clipcrop-core/src/processing/batch.rs
// ============================================================================
//
// BATCH ORCHESTRATOR: Bounded concurrent processing of a descriptor file
//
// Every non-blank line of the descriptor file becomes one item. Items run on
// a dedicated worker pool of exactly `num_workers` threads and each one ends
// in a terminal `ClipOutcome`; a failing item never affects its siblings,
// and a panic inside one item is caught and reported as that item's failure.
//
// Only batch-level problems return `Err`: invalid configuration, an
// unreadable descriptor file, an output directory that cannot be created, or
// a worker pool that cannot be built.

use crate::config::BatchConfig;
use crate::descriptor::{ClipSpec, DescriptorLine, read_descriptor_file};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, FfprobeExecutor};
use crate::processing::pipeline::{ClipOutcome, ClipReport, cancelled_report, process_clip};
use crate::reporting::BatchSummary;

use log::{error, info, warn};
use rayon::prelude::*;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Receives batch lifecycle notifications. Called from worker threads.
pub trait BatchObserver: Sync {
    /// Called once, after the descriptor file is read and before any item starts.
    fn batch_started(&self, _total: usize) {}

    /// Called as each item reaches a terminal state, in completion order.
    fn clip_finished(&self, _report: &ClipReport) {}

    /// Called once with the final tallies.
    fn batch_finished(&self, _summary: &BatchSummary) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Everything a finished batch produced.
#[derive(Debug)]
pub struct BatchReport {
    /// One report per item, in descriptor file order.
    pub clips: Vec<ClipReport>,
    pub summary: BatchSummary,
}

/// Runs every clip in `config.descriptor_file`.
///
/// Setting `stop` prevents items that have not started yet from starting;
/// they are reported as cancelled. Items already running finish normally.
///
/// # Errors
///
/// Returns an error only for batch-level failures. Per-item failures are in
/// the returned report.
pub fn run_batch<S, P, O>(
    config: &BatchConfig,
    spawner: &S,
    prober: &P,
    observer: &O,
    stop: &AtomicBool,
) -> CoreResult<BatchReport>
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
    O: BatchObserver,
{
    config.validate()?;
    let start = Instant::now();

    let lines = read_descriptor_file(&config.descriptor_file)?;
    std::fs::create_dir_all(&config.output_dir)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.num_workers)
        .thread_name(|index| format!("clipcrop-worker-{index}"))
        .build()
        .map_err(|e| CoreError::WorkerPool(e.to_string()))?;

    info!(
        "Processing {} clip(s) from {} with {} worker(s)",
        lines.len(),
        config.descriptor_file.display(),
        config.num_workers
    );
    observer.batch_started(lines.len());

    let clips: Vec<ClipReport> = pool.install(|| {
        lines
            .par_iter()
            .map(|line| {
                let report = if stop.load(Ordering::SeqCst) {
                    cancelled_report(line)
                } else {
                    run_contained(config, spawner, prober, line)
                };
                observer.clip_finished(&report);
                report
            })
            .collect()
    });

    let summary = BatchSummary::from_reports(&clips, start.elapsed());
    if summary.cancelled > 0 {
        warn!("Batch interrupted: {} clip(s) were not started", summary.cancelled);
    }
    info!(
        "Batch finished in {:.2}s: {} succeeded, {} skipped, {} failed, {} planned, {} cancelled",
        summary.elapsed.as_secs_f64(),
        summary.succeeded,
        summary.skipped,
        summary.failed,
        summary.planned,
        summary.cancelled
    );
    observer.batch_finished(&summary);

    Ok(BatchReport { clips, summary })
}

/// Runs one item, turning a panic anywhere below it into a failed report.
fn run_contained<S, P>(config: &BatchConfig, spawner: &S, prober: &P, line: &DescriptorLine) -> ClipReport
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
{
    match panic::catch_unwind(AssertUnwindSafe(|| process_clip(config, spawner, prober, line))) {
        Ok(report) => report,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("Worker panicked on line {}: {message}", line.line_number);

            let spec = ClipSpec::parse(&line.text).ok();
            // A panic after the skip checks may have left a partial encode behind
            if let Some(output) = spec.as_ref().map(|s| s.output_path(&config.output_dir)) {
                if output.exists() {
                    if let Err(e) = std::fs::remove_file(&output) {
                        warn!("Could not remove {} after panic: {e}", output.display());
                    }
                }
            }

            ClipReport {
                line_number: line.line_number,
                descriptor: line.text.clone(),
                video_name: spec.map(|s| s.video_name),
                outcome: ClipOutcome::Failed(CoreError::Panic(message)),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{MockFfmpegSpawner, MockFfprobeExecutor};
    use crate::media::{FrameRate, MediaIntrinsics};
    use std::fs;
    use std::sync::Mutex;

    struct Recorder {
        started: Mutex<Option<usize>>,
        finished: Mutex<Vec<usize>>,
    }

    impl BatchObserver for Recorder {
        fn batch_started(&self, total: usize) {
            *self.started.lock().unwrap() = Some(total);
        }

        fn clip_finished(&self, report: &ClipReport) {
            self.finished.lock().unwrap().push(report.line_number);
        }
    }

    #[test]
    fn test_reports_follow_descriptor_order() {
        let dir = tempfile::tempdir().unwrap();
        let input_dir = dir.path().join("videos");
        fs::create_dir_all(&input_dir).unwrap();
        let descriptor = dir.path().join("clips.txt");
        fs::write(&descriptor, "a,100,100,0,9,0,0,50,50\n\nb,100,100,0,9,0,0,50,50\nbad\n").unwrap();

        let config = BatchConfig::new(descriptor, input_dir, dir.path().join("out"));
        let prober = MockFfprobeExecutor::with_default(MediaIntrinsics {
            width: 100,
            height: 100,
            frame_rate: FrameRate::new(25, 1).unwrap(),
        });
        let recorder = Recorder {
            started: Mutex::new(None),
            finished: Mutex::new(Vec::new()),
        };

        let report = run_batch(
            &config,
            &MockFfmpegSpawner::new(),
            &prober,
            &recorder,
            &AtomicBool::new(false),
        )
        .unwrap();

        let lines: Vec<usize> = report.clips.iter().map(|c| c.line_number).collect();
        assert_eq!(lines, vec![1, 3, 4]);
        assert_eq!(*recorder.started.lock().unwrap(), Some(3));
        assert_eq!(recorder.finished.lock().unwrap().len(), 3);
        assert_eq!(report.summary.skipped, 2);
        assert_eq!(report.summary.failed, 1);
        assert!(config.output_dir.is_dir());
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = BatchConfig::new(dir.path().join("clips.txt"), dir.path().to_path_buf(), dir.path().join("out"));
        config.num_workers = 0;
        let result = run_batch(
            &config,
            &MockFfmpegSpawner::new(),
            &MockFfprobeExecutor::new(),
            &NoopObserver,
            &AtomicBool::new(false),
        );
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn test_missing_descriptor_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = BatchConfig::new(dir.path().join("absent.txt"), dir.path().to_path_buf(), dir.path().join("out"));
        let result = run_batch(
            &config,
            &MockFfmpegSpawner::new(),
            &MockFfprobeExecutor::new(),
            &NoopObserver,
            &AtomicBool::new(false),
        );
        assert!(matches!(result, Err(CoreError::DescriptorFile { .. })));
    }

    #[test]
    fn test_panic_message_from_payload() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("owned boom")), "owned boom");
        assert_eq!(panic_message(&42_u8), "unknown panic payload");
    }
}
