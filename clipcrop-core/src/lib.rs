//! Core library for batch clip extraction with ffmpeg and ffprobe.
//!
//! A clip descriptor names a source video, the reference resolution the clip
//! was annotated at, an inclusive frame range and a crop box. This crate
//! parses descriptors, probes each source for its real resolution and frame
//! rate, rescales the crop box, and encodes a trimmed, cropped and resampled
//! clip. Batches run on a bounded worker pool; an existing output file marks
//! a clip as done, so re-running a batch only processes what is missing.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use clipcrop_core::{BatchConfig, NoopObserver, run_batch};
//! use clipcrop_core::external::{CrateFfprobeExecutor, SidecarSpawner};
//! use std::path::PathBuf;
//! use std::sync::atomic::AtomicBool;
//!
//! let mut config = BatchConfig::new(
//!     PathBuf::from("clips.txt"),
//!     PathBuf::from("/path/to/videos"),
//!     PathBuf::from("/path/to/clips"),
//! );
//! config.num_workers = 4;
//!
//! let report = run_batch(
//!     &config,
//!     &SidecarSpawner,
//!     &CrateFfprobeExecutor::new(),
//!     &NoopObserver,
//!     &AtomicBool::new(false),
//! )
//! .unwrap();
//! println!("{} clip(s) encoded", report.summary.succeeded);
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod external;
pub mod media;
pub mod processing;
pub mod reporting;
pub mod utils;

// Re-exports for public API
pub use config::BatchConfig;
pub use descriptor::{ClipSpec, DescriptorLine, read_descriptor_file};
pub use error::{CoreError, CoreResult, ParseError};
pub use external::check_media_dependencies;
pub use media::{FrameRate, MediaIntrinsics};
pub use processing::{
    BatchObserver, BatchReport, ClipOutcome, ClipReport, NoopObserver, SkipReason, run_batch,
};
pub use reporting::{BatchSummary, FailureRecord};
pub use utils::{format_bytes, format_duration};
