//! Clip processing: coordinate resolution, the ffmpeg transform, the
//! per-clip pipeline and the concurrent batch orchestrator.

/// Reference-space to source-space coordinate resolution
pub mod resolve;

/// ffmpeg trim/crop/resample executor
pub mod transform;

/// Per-clip state machine
pub mod pipeline;

/// Bounded concurrent batch runner
pub mod batch;

pub use batch::{BatchObserver, BatchReport, NoopObserver, run_batch};
pub use pipeline::{ClipOutcome, ClipReport, SkipReason, process_clip};
pub use resolve::{CropRect, ResolvedWindow, resolve};
pub use transform::{TransformRequest, build_filter_graph, plan_transform, run_transform};
