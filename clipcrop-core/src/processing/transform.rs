// ============================================================================
// clipcrop-core/src/processing/transform.rs
// ============================================================================
//
// TRANSFORM EXECUTOR: Trim, crop and resample one clip with ffmpeg
//
// The filter graph is fixed so outputs stay compatible across runs:
//
//   [0:v] trim(start_frame, end_frame + 1) -> setpts(PTS-STARTPTS) -> crop(w:h:x:y)
//   [0:a] atrim(start_time, end_time)      -> asetpts(PTS-STARTPTS) -> aresample(rate)
//   concat(n=1, v=1, a=1) -> libx264 @ 2M + aac @ rate
//
// Video is trimmed by frame index, audio by time. A failed run never leaves
// a file at the output path, since that path doubles as the "already done"
// marker for later batches.

use crate::config::{AUDIO_CODEC, VIDEO_BITRATE, VIDEO_CODEC};
use crate::error::{CoreError, CoreResult, command_failed_error};
use crate::external::FfmpegProcess;
use crate::external::ffmpeg_executor::{FfmpegSpawner, command_line};
use crate::processing::resolve::ResolvedWindow;

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel as FfmpegLogLevel};
use log::{debug, warn};

use std::path::Path;
use std::time::Instant;

/// Everything the executor needs for one clip.
#[derive(Debug, Clone, Copy)]
pub struct TransformRequest<'a> {
    pub input_path: &'a Path,
    pub output_path: &'a Path,
    pub window: &'a ResolvedWindow,
    pub sample_rate: u32,
}

/// Formats seconds for ffmpeg duration options (shortest exact decimal of the f64).
fn format_seconds(secs: f64) -> String {
    format!("{secs}")
}

/// Builds the `-filter_complex` graph for a resolved clip.
#[must_use]
pub fn build_filter_graph(window: &ResolvedWindow, sample_rate: u32) -> String {
    let crop = &window.crop;
    format!(
        "[0:v]trim=start_frame={}:end_frame={},setpts=PTS-STARTPTS,crop={}:{}:{}:{}[v];\
         [0:a]atrim=start={}:end={},asetpts=PTS-STARTPTS,aresample={}[a];\
         [v][a]concat=n=1:v=1:a=1[outv][outa]",
        window.start_frame,
        window.end_frame.saturating_add(1),
        crop.width(),
        crop.height(),
        crop.left,
        crop.top,
        format_seconds(window.start_secs()),
        format_seconds(window.end_secs()),
        sample_rate
    )
}

/// Builds the complete ffmpeg command for a clip. The output path is the last argument.
#[must_use]
pub fn build_transform_command(request: &TransformRequest<'_>) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.input(&*request.input_path.to_string_lossy());
    cmd.args([
        "-filter_complex".to_string(),
        build_filter_graph(request.window, request.sample_rate),
    ]);
    cmd.args(["-map", "[outv]", "-map", "[outa]"]);
    cmd.args(["-c:v", VIDEO_CODEC, "-b:v", VIDEO_BITRATE]);
    cmd.args(["-c:a", AUDIO_CODEC]);
    cmd.args(["-ar".to_string(), request.sample_rate.to_string()]);
    // Overwrite: only reachable for outputs created after the idempotency check
    cmd.arg("-y");
    cmd.output(&*request.output_path.to_string_lossy());
    cmd
}

/// Renders the command for a clip without running it.
#[must_use]
pub fn plan_transform(request: &TransformRequest<'_>) -> String {
    command_line(&mut build_transform_command(request))
}

/// Runs the transform for one clip.
///
/// # Errors
///
/// `CoreError::Encode` for any spawn, event or exit failure. The output
/// path is removed before the error is returned.
pub fn run_transform<S: FfmpegSpawner>(spawner: &S, request: &TransformRequest<'_>) -> CoreResult<()> {
    let result = execute(spawner, request);
    if let Err(e) = &result {
        remove_partial_output(request.output_path);
        return Err(CoreError::Encode {
            path: request.output_path.to_path_buf(),
            message: e.to_string(),
        });
    }
    result
}

fn execute<S: FfmpegSpawner>(spawner: &S, request: &TransformRequest<'_>) -> CoreResult<()> {
    let mut cmd = build_transform_command(request);
    debug!("FFmpeg command: {}", command_line(&mut cmd));

    let start = Instant::now();
    let mut child = spawner.spawn(cmd)?;

    let mut handler = EncodeEventHandler::new(request.window.duration().as_secs_f64());
    child.handle_events(|event| {
        handler.handle_event(event);
        Ok(())
    })?;

    let status = child.wait()?;
    if !status.success() {
        let stderr = handler.stderr_buffer().trim();
        return Err(command_failed_error(
            "ffmpeg",
            status,
            if stderr.is_empty() { "no error output" } else { stderr },
        ));
    }

    debug!(
        "Encoded {} in {:.2}s",
        request.output_path.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Deletes whatever a failed encode left at `path`.
pub fn remove_partial_output(path: &Path) {
    if !path.exists() {
        return;
    }
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed partial output {}", path.display()),
        Err(e) => warn!("Failed to remove partial output {}: {e}", path.display()),
    }
}

/// Routes ffmpeg events to the log and keeps error lines for the failure message.
struct EncodeEventHandler {
    clip_secs: f64,
    stderr_buffer: String,
}

impl EncodeEventHandler {
    fn new(clip_secs: f64) -> Self {
        Self {
            clip_secs,
            stderr_buffer: String::new(),
        }
    }

    fn handle_event(&mut self, event: FfmpegEvent) {
        match event {
            FfmpegEvent::Progress(progress) => {
                log::trace!(
                    target: "ffmpeg_log",
                    "frame={} time={} / {:.2}s speed={:.2}x",
                    progress.frame,
                    progress.time,
                    self.clip_secs,
                    progress.speed
                );
            }
            FfmpegEvent::Log(level, message) => {
                let level = map_ffmpeg_log_level(&level);
                if level <= log::Level::Error {
                    self.push_stderr(&message);
                }
                if level == log::Level::Info {
                    log::debug!(target: "ffmpeg_log", "{message}");
                } else {
                    log::log!(target: "ffmpeg_log", level, "{message}");
                }
            }
            FfmpegEvent::Error(error) => {
                log::debug!(target: "ffmpeg_log", "ffmpeg error: {error}");
                self.push_stderr(&error);
            }
            _ => {}
        }
    }

    fn push_stderr(&mut self, line: &str) {
        self.stderr_buffer.push_str(line);
        self.stderr_buffer.push('\n');
    }

    fn stderr_buffer(&self) -> &str {
        &self.stderr_buffer
    }
}

/// Maps `FFmpeg` log level to Rust log level
fn map_ffmpeg_log_level(level: &FfmpegLogLevel) -> log::Level {
    match level {
        FfmpegLogLevel::Fatal | FfmpegLogLevel::Error => log::Level::Error,
        FfmpegLogLevel::Warning => log::Level::Warn,
        FfmpegLogLevel::Info => log::Level::Info,
        _ => log::Level::Trace,
    }
}
