// clipcrop-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and when the "test-mocks" feature is enabled.

use super::{FfmpegProcess, FfmpegSpawner, FfprobeExecutor};
use crate::error::{CoreError, CoreResult, command_start_error};
use crate::external::ffmpeg_executor::command_args;
use crate::media::MediaIntrinsics;

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

/// Mock implementation of FfmpegProcess.
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Vec<FfmpegEvent>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in std::mem::take(&mut self.events_to_emit) {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// What a mocked ffmpeg invocation does.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Exits 0 after writing a small file at the output path.
    Success,
    /// Exits 0 without writing anything.
    SuccessWithoutOutput,
    /// Exits with `exit_code`, optionally leaving a truncated file behind.
    ExitFailure { exit_code: i32, write_partial_output: bool },
    /// The process cannot be started at all.
    SpawnFailure,
}

struct MockFfmpegExpectation {
    arg_pattern: String,
    outcome: MockOutcome,
    events: Vec<FfmpegEvent>,
}

/// Mock implementation of FfmpegSpawner.
///
/// Expectations are matched against the command arguments by substring and
/// consumed on first match. Calls that match no expectation fall back to the
/// default outcome, which is `Success` unless changed.
pub struct MockFfmpegSpawner {
    expectations: Mutex<Vec<MockFfmpegExpectation>>,
    default_outcome: Mutex<MockOutcome>,
    received_calls: Mutex<Vec<Vec<String>>>,
}

impl Default for MockFfmpegSpawner {
    fn default() -> Self {
        Self {
            expectations: Mutex::new(Vec::new()),
            default_outcome: Mutex::new(MockOutcome::Success),
            received_calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_default_outcome(&self, outcome: MockOutcome) {
        *self.default_outcome.lock().unwrap() = outcome;
    }

    pub fn add_expectation(&self, arg_pattern: &str, outcome: MockOutcome, events: Vec<FfmpegEvent>) {
        self.expectations.lock().unwrap().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            outcome,
            events,
        });
    }

    pub fn add_success_expectation(&self, arg_pattern: &str) {
        self.add_expectation(arg_pattern, MockOutcome::Success, Vec::new());
    }

    pub fn add_exit_error_expectation(&self, arg_pattern: &str, events: Vec<FfmpegEvent>, exit_code: i32) {
        self.add_expectation(
            arg_pattern,
            MockOutcome::ExitFailure {
                exit_code,
                write_partial_output: true,
            },
            events,
        );
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str) {
        self.add_expectation(arg_pattern, MockOutcome::SpawnFailure, Vec::new());
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.received_calls.lock().unwrap().len()
    }
}

fn write_output(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            log::error!("MockFfmpegSpawner failed to create parent dir {parent:?}: {e}");
        }
    }
    match std::fs::write(path, contents) {
        Ok(()) => log::info!("MockFfmpegSpawner wrote output file: {path:?}"),
        Err(e) => log::error!("MockFfmpegSpawner failed to write output file {path:?}: {e}"),
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args = command_args(&mut cmd);
        self.received_calls.lock().unwrap().push(args.clone());

        let matched = {
            let mut expectations = self.expectations.lock().unwrap();
            expectations
                .iter()
                .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)))
                .map(|index| expectations.remove(index))
        };
        let (outcome, events) = match matched {
            Some(exp) => {
                log::info!("MockFfmpegSpawner: matched expectation with pattern '{}'", exp.arg_pattern);
                (exp.outcome, exp.events)
            }
            None => (self.default_outcome.lock().unwrap().clone(), Vec::new()),
        };

        let output_path = args.last().map(PathBuf::from);
        match outcome {
            MockOutcome::Success => {
                if let Some(path) = &output_path {
                    write_output(path, b"mock encoded clip");
                }
                Ok(MockFfmpegProcess {
                    events_to_emit: events,
                    exit_status: exit_status(0),
                })
            }
            MockOutcome::SuccessWithoutOutput => Ok(MockFfmpegProcess {
                events_to_emit: events,
                exit_status: exit_status(0),
            }),
            MockOutcome::ExitFailure {
                exit_code,
                write_partial_output,
            } => {
                if write_partial_output {
                    if let Some(path) = &output_path {
                        write_output(path, b"trunc");
                    }
                }
                Ok(MockFfmpegProcess {
                    events_to_emit: events,
                    exit_status: exit_status(exit_code),
                })
            }
            MockOutcome::SpawnFailure => Err(command_start_error(
                "ffmpeg (mock)",
                io::Error::new(io::ErrorKind::NotFound, "simulated spawn failure"),
            )),
        }
    }
}

/// Mock implementation of FfprobeExecutor.
///
/// Results are registered per path; unknown paths return the default
/// intrinsics when one is set and a probe error otherwise.
#[derive(Default)]
pub struct MockFfprobeExecutor {
    results: Mutex<HashMap<PathBuf, Result<MediaIntrinsics, String>>>,
    default_intrinsics: Mutex<Option<MediaIntrinsics>>,
    calls: AtomicUsize,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor that answers every path with `intrinsics`.
    pub fn with_default(intrinsics: MediaIntrinsics) -> Self {
        let executor = Self::default();
        *executor.default_intrinsics.lock().unwrap() = Some(intrinsics);
        executor
    }

    pub fn expect_intrinsics(&self, input_path: &Path, intrinsics: MediaIntrinsics) {
        self.results
            .lock()
            .unwrap()
            .insert(input_path.to_path_buf(), Ok(intrinsics));
    }

    pub fn expect_error(&self, input_path: &Path, message: &str) {
        self.results
            .lock()
            .unwrap()
            .insert(input_path.to_path_buf(), Err(message.to_string()));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn probe(&self, input_path: &Path) -> CoreResult<MediaIntrinsics> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let probe_error = |message: String| CoreError::Probe {
            path: input_path.to_path_buf(),
            message,
        };
        match self.results.lock().unwrap().get(input_path) {
            Some(Ok(intrinsics)) => Ok(*intrinsics),
            Some(Err(message)) => Err(probe_error(message.clone())),
            None => (*self.default_intrinsics.lock().unwrap()).ok_or_else(|| {
                probe_error("MockFfprobeExecutor: no expectation set".to_string())
            }),
        }
    }
}
