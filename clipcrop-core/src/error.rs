// ============================================================================
// clipcrop-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the clipcrop-core library
//
// This module defines the error taxonomy used throughout the library. Errors
// that belong to a single clip (parse, probe, resolve, encode, or a panic) are caught at
// the per-item boundary by the batch orchestrator and turned into a failed
// outcome; the remaining variants are batch-level and abort the run.
//
// Skips (missing source, output already present) are not errors and are
// modelled by `processing::SkipReason` instead.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors produced while parsing a single clip descriptor line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} comma-separated fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("video name is empty")]
    EmptyName,

    #[error("field '{field}' is not a non-negative integer: '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("invalid clip geometry: {0}")]
    InvalidRange(String),
}

/// Main error type for the clipcrop-core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed clip descriptor: {0}")]
    Parse(#[from] ParseError),

    #[error("Failed to probe {path}: {message}")]
    Probe { path: PathBuf, message: String },

    #[error("Cannot resolve clip window: {0}")]
    Resolve(String),

    #[error("Encode failed for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, io::Error),

    #[error("Failed to wait for command '{0}': {1}")]
    CommandWait(String, io::Error),

    #[error("Command '{cmd}' failed with {status}: {stderr}")]
    CommandFailed {
        cmd: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cannot read clip descriptor file {path}: {source}")]
    DescriptorFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),

    #[error("Worker panicked: {0}")]
    Panic(String),
}

/// Result type for clipcrop-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Creates a `CoreError::CommandStart` for a command that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Creates a `CoreError::CommandWait` for a command whose exit status could not be collected.
pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

/// Creates a `CoreError::CommandFailed` for a command that exited unsuccessfully.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        cmd: cmd.into(),
        status,
        stderr: stderr.into(),
    }
}

impl CoreError {
    /// Short label for the pipeline stage an error belongs to, used in logs and summaries.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            CoreError::Parse(_) => "parse",
            CoreError::Probe { .. } => "probe",
            CoreError::Resolve(_) => "resolve",
            CoreError::Encode { .. }
            | CoreError::CommandStart(..)
            | CoreError::CommandWait(..)
            | CoreError::CommandFailed { .. } => "encode",
            CoreError::Panic(_) => "panic",
            _ => "batch",
        }
    }
}
