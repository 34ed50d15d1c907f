//! FFprobe integration for reading source media intrinsics.
//!
//! The prober looks at the first stream whose `codec_type` is `video` and
//! extracts its pixel dimensions and exact frame rate. It is read-only.

use crate::error::{CoreError, CoreResult};
use crate::media::{FrameRate, MediaIntrinsics};

use ffprobe::{FfProbe, FfProbeError, ffprobe};

use std::path::Path;

/// Something that can inspect a media file.
///
/// Implementations are shared by every worker of the batch pool.
pub trait FfprobeExecutor: Sync {
    /// Returns the intrinsics of the first video stream in `input_path`.
    fn probe(&self, input_path: &Path) -> CoreResult<MediaIntrinsics>;
}

/// `FfprobeExecutor` backed by the `ffprobe` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn probe(&self, input_path: &Path) -> CoreResult<MediaIntrinsics> {
        log::debug!("Running ffprobe (via crate) on: {}", input_path.display());
        match ffprobe(input_path) {
            Ok(metadata) => intrinsics_from_metadata(&metadata, input_path),
            Err(err) => {
                log::error!("ffprobe failed on {}: {err:?}", input_path.display());
                Err(map_ffprobe_error(err, input_path))
            }
        }
    }
}

/// Extracts `MediaIntrinsics` from parsed ffprobe output.
pub fn intrinsics_from_metadata(metadata: &FfProbe, input_path: &Path) -> CoreResult<MediaIntrinsics> {
    let probe_error = |message: String| CoreError::Probe {
        path: input_path.to_path_buf(),
        message,
    };

    let video_stream = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| probe_error("no video stream found".to_string()))?;

    let width = video_stream
        .width
        .ok_or_else(|| probe_error("video stream missing width".to_string()))?;
    let height = video_stream
        .height
        .ok_or_else(|| probe_error("video stream missing height".to_string()))?;
    let (width, height) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(probe_error(format!(
                "invalid dimensions width={width}, height={height}"
            )));
        }
    };

    let frame_rate = FrameRate::parse(&video_stream.r_frame_rate)
        .or_else(|| FrameRate::parse(&video_stream.avg_frame_rate))
        .ok_or_else(|| {
            probe_error(format!(
                "unusable frame rate r_frame_rate='{}', avg_frame_rate='{}'",
                video_stream.r_frame_rate, video_stream.avg_frame_rate
            ))
        })?;

    Ok(MediaIntrinsics {
        width,
        height,
        frame_rate,
    })
}

fn map_ffprobe_error(err: FfProbeError, input_path: &Path) -> CoreError {
    let message = match err {
        FfProbeError::Io(io_err) => format!("could not start ffprobe: {io_err}"),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            format!("ffprobe exited with {}: {}", output.status, stderr.trim())
        }
        FfProbeError::Deserialize(err) => format!("could not parse ffprobe output: {err}"),
        #[allow(unreachable_patterns)]
        other => format!("unknown ffprobe error: {other:?}"),
    };
    CoreError::Probe {
        path: input_path.to_path_buf(),
        message,
    }
}
