// ============================================================================
// clipcrop-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Batch Configuration and Encoding Constants
//
// This module defines the configuration handed to the batch orchestrator and
// the fixed encoding profile every output clip is produced with.
//
// USAGE:
// Instances of BatchConfig are created by consumers of the library (like
// clipcrop-cli) and passed by reference to `run_batch`. Workers only ever see
// a shared, read-only view of it.

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::path::PathBuf;

// ============================================================================
// DEFAULT CONSTANTS
// ============================================================================

/// Default number of worker threads in the batch pool.
pub const DEFAULT_NUM_WORKERS: usize = 8;

/// Default output audio sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Extension of source videos (`<input_dir>/<video_name>.mp4`) and of outputs.
pub const SOURCE_EXTENSION: &str = "mp4";

// ============================================================================
// ENCODING PROFILE
// ============================================================================

/// Video encoder used for every output clip.
pub const VIDEO_CODEC: &str = "libx264";

/// Audio encoder used for every output clip.
pub const AUDIO_CODEC: &str = "aac";

/// Target video bitrate for every output clip.
pub const VIDEO_BITRATE: &str = "2M";

// ============================================================================
// BATCH CONFIGURATION
// ============================================================================

/// Configuration for one batch run.
///
/// # Examples
///
/// ```rust
/// use clipcrop_core::BatchConfig;
/// use std::path::PathBuf;
///
/// let mut config = BatchConfig::new(
///     PathBuf::from("clips.txt"),
///     PathBuf::from("data/youtube_videos"),
///     PathBuf::from("data/clips"),
/// );
/// config.num_workers = 4;
/// assert_eq!(config.sample_rate, 16_000);
/// ```
#[derive(Debug, Clone)]
pub struct BatchConfig {
    // ---- Path Configuration ----

    /// Text file with one clip descriptor per line
    pub descriptor_file: PathBuf,

    /// Directory containing the source `<video_name>.mp4` files
    pub input_dir: PathBuf,

    /// Directory where output clips are written (created if absent)
    pub output_dir: PathBuf,

    // ---- Processing Options ----

    /// Number of clips processed concurrently
    pub num_workers: usize,

    /// Output audio sample rate in Hz
    pub sample_rate: u32,

    /// Shrink odd crop widths/heights by one pixel so 4:2:0 encoders accept them
    pub even_crop: bool,

    /// Resolve every clip and build its ffmpeg command without running it
    pub dry_run: bool,
}

impl BatchConfig {
    /// Creates a configuration with default worker count and sample rate.
    #[must_use]
    pub fn new(descriptor_file: PathBuf, input_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            descriptor_file,
            input_dir,
            output_dir,
            num_workers: DEFAULT_NUM_WORKERS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            even_crop: false,
            dry_run: false,
        }
    }

    /// Validates the configuration values.
    ///
    /// The descriptor file itself is checked when it is read, so an
    /// unreadable file surfaces as `CoreError::DescriptorFile`.
    pub fn validate(&self) -> CoreResult<()> {
        if self.num_workers == 0 {
            return Err(CoreError::Config(
                "num_workers must be at least 1".to_string(),
            ));
        }
        if self.sample_rate == 0 {
            return Err(CoreError::Config(
                "sample_rate must be greater than 0".to_string(),
            ));
        }
        if !self.input_dir.is_dir() {
            return Err(CoreError::Config(format!(
                "input directory '{}' does not exist or is not a directory",
                self.input_dir.display()
            )));
        }
        Ok(())
    }
}
