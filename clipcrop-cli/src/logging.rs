// ============================================================================
// clipcrop-cli/src/logging.rs
// ============================================================================
//
// LOGGING: fern-based console and file logging
//
// The console chain writes to stderr at Info, or Debug with `--verbose`.
// Lines go through the active progress bar so a running bar is never torn
// by a log line. When a log directory is given, a second chain writes a
// timestamped Debug-level run log there.

// ---- Internal crate imports ----
use crate::error::CliResult;
use crate::progress::write_console_line;

// ---- External crate imports ----
use clipcrop_core::CoreError;
use log::LevelFilter;

// ---- Standard library imports ----
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// ```
/// let log_filename = format!("clipcrop_run_{}.log", clipcrop_cli::logging::get_timestamp());
/// assert!(log_filename.ends_with(".log"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Path of the run log for a given timestamp.
#[must_use]
pub fn log_file_path(log_dir: &Path, timestamp: &str) -> PathBuf {
    log_dir.join(format!("clipcrop_run_{timestamp}.log"))
}

/// Console level: Debug with `--verbose`, Info otherwise.
#[must_use]
pub fn console_level(verbose: bool) -> LevelFilter {
    if verbose { LevelFilter::Debug } else { LevelFilter::Info }
}

/// Installs the global logger. Returns the run log path when file logging is on.
///
/// # Errors
///
/// Fails if the log directory or file cannot be created, or if a logger is
/// already installed.
pub fn setup_logging(verbose: bool, log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let console = fern::Dispatch::new()
        .format(|out, message, record| match record.level() {
            log::Level::Info => out.finish(format_args!("{message}")),
            level => out.finish(format_args!("[{level}] {message}")),
        })
        .level(console_level(verbose))
        .chain(fern::Output::call(|record| write_console_line(&record.args().to_string())));

    let mut dispatch = fern::Dispatch::new().chain(console);

    let mut log_path = None;
    if let Some(dir) = log_dir {
        std::fs::create_dir_all(dir)?;
        let path = log_file_path(dir, &get_timestamp());
        let file = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "{} {:<5} [{}] {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    message
                ));
            })
            .level(LevelFilter::Debug)
            .chain(fern::log_file(&path)?);
        dispatch = dispatch.chain(file);
        log_path = Some(path);
    }

    dispatch
        .apply()
        .map_err(|e| CoreError::Config(format!("failed to initialize logging: {e}")))?;
    Ok(log_path)
}
