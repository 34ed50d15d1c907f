// ============================================================================
// clipcrop-cli/src/commands/crop.rs
// ============================================================================
//
// CROP COMMAND: Batch clip extraction
//
// Turns the parsed arguments into a `BatchConfig`, checks that ffmpeg and
// ffprobe are installed (unless this is a dry run), runs the batch with a
// progress bar and prints the summary.
//
// Per-clip failures do not make the command fail; only problems that stop
// the whole batch from running do.

// ---- Internal crate imports ----
use crate::cli::CropArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::progress::BatchProgress;
use crate::terminal;

// ---- External crate imports ----
use clipcrop_core::external::{CrateFfprobeExecutor, FfmpegSpawner, FfprobeExecutor, SidecarSpawner};
use clipcrop_core::{
    BatchConfig, BatchReport, BatchSummary, ClipOutcome, check_media_dependencies, format_bytes,
    format_duration, run_batch,
};
use log::{debug, info};

// ---- Standard library imports ----
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::atomic::AtomicBool;

/// Builds the batch configuration from command-line arguments.
#[must_use]
pub fn batch_config(args: &CropArgs) -> BatchConfig {
    let mut config = BatchConfig::new(
        args.clip_info_file.clone(),
        args.input_dir.clone(),
        args.output_dir.clone(),
    );
    config.num_workers = args.num_workers;
    config.sample_rate = args.sample_rate;
    config.even_crop = args.even_crop;
    config.dry_run = args.dry_run;
    config
}

/// Runs the crop command against real ffmpeg/ffprobe.
pub fn run_crop_command(args: &CropArgs, stop: &AtomicBool, verbose: bool) -> CliResult<BatchSummary> {
    if !args.dry_run {
        check_media_dependencies()?;
    }
    run_crop(&SidecarSpawner, &CrateFfprobeExecutor::new(), args, stop, verbose)
}

/// Runs the crop command with the given collaborators.
pub fn run_crop<S: FfmpegSpawner, P: FfprobeExecutor>(
    spawner: &S,
    prober: &P,
    args: &CropArgs,
    stop: &AtomicBool,
    verbose: bool,
) -> CliResult<BatchSummary> {
    let config = batch_config(args);
    config.validate()?;

    terminal::print_section("Clip extraction");
    terminal::print_status("Descriptor file", &config.descriptor_file.display().to_string());
    terminal::print_status("Input dir", &config.input_dir.display().to_string());
    terminal::print_status("Output dir", &config.output_dir.display().to_string());
    terminal::print_status("Workers", &config.num_workers.to_string());
    terminal::print_status("Sample rate", &format!("{} Hz", config.sample_rate));
    if config.even_crop {
        terminal::print_status("Even crop", "on");
    }
    if config.dry_run {
        terminal::print_status("Mode", "dry run");
    }

    // Per-clip log lines already describe progress in verbose mode
    let progress = BatchProgress::new(verbose);
    let report = run_batch(&config, spawner, prober, &progress, stop)?;

    print_clip_details(&report);
    print_summary(&report.summary);

    if let Some(path) = &args.summary_json {
        write_summary_json(&report.summary, path)?;
        info!("Summary written to {}", path.display());
    }

    Ok(report.summary)
}

fn print_clip_details(report: &BatchReport) {
    for clip in &report.clips {
        match &clip.outcome {
            ClipOutcome::Succeeded {
                output_path,
                output_size,
                elapsed,
            } => debug!(
                "{}: {} ({}) in {}",
                clip.label(),
                output_path.display(),
                format_bytes(*output_size),
                format_duration(elapsed.as_secs_f64())
            ),
            // Plans are the product of a dry run, so they go to stdout
            ClipOutcome::Planned { command, .. } => println!("{command}"),
            ClipOutcome::Failed(e) => terminal::print_error(&format!("{}: {e}", clip.label())),
            ClipOutcome::Skipped(_) | ClipOutcome::Cancelled => {}
        }
    }
}

fn print_summary(summary: &BatchSummary) {
    terminal::print_section("Summary");
    terminal::print_status("Clips", &summary.total.to_string());
    terminal::print_status("Succeeded", &summary.succeeded.to_string());
    terminal::print_status("Skipped", &summary.skipped.to_string());
    terminal::print_status("Failed", &summary.failed.to_string());
    if summary.planned > 0 {
        terminal::print_status("Planned", &summary.planned.to_string());
    }
    if summary.cancelled > 0 {
        terminal::print_status("Not started", &summary.cancelled.to_string());
    }
    terminal::print_status("Elapsed", &format_duration(summary.elapsed.as_secs_f64()));

    if summary.cancelled > 0 {
        terminal::print_warning("Interrupted before all clips were started");
    } else if summary.is_clean() {
        terminal::print_success("All clips processed");
    } else {
        terminal::print_warning(&format!("{} clip(s) failed", summary.failed));
    }
}

/// Writes the summary as pretty-printed JSON.
pub fn write_summary_json(summary: &BatchSummary, path: &Path) -> CliResult<()> {
    let file = File::create(path).cli_context(format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .map_err(std::io::Error::from)
        .cli_context(format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipcrop_core::external::mocks::{MockFfmpegSpawner, MockFfprobeExecutor};
    use clipcrop_core::{FrameRate, MediaIntrinsics};
    use std::fs;
    use std::path::PathBuf;

    fn args(root: &Path) -> CropArgs {
        CropArgs {
            input_dir: root.join("videos"),
            clip_info_file: root.join("clips.txt"),
            output_dir: root.join("clips"),
            num_workers: 2,
            sample_rate: 16000,
            even_crop: false,
            dry_run: false,
            summary_json: Some(root.join("summary.json")),
            log_dir: None,
        }
    }

    #[test]
    fn test_crop_writes_clips_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path());
        fs::create_dir_all(&args.input_dir).unwrap();
        fs::write(args.input_dir.join("abc.mp4"), b"video").unwrap();
        fs::write(&args.clip_info_file, "abc,360,640,0,29,0,0,320,180\nmissing,360,640,0,29,0,0,320,180\n").unwrap();

        let prober = MockFfprobeExecutor::with_default(MediaIntrinsics {
            width: 640,
            height: 360,
            frame_rate: FrameRate::new(25, 1).unwrap(),
        });
        let summary = run_crop(&MockFfmpegSpawner::new(), &prober, &args, &AtomicBool::new(false), false).unwrap();

        assert_eq!((summary.succeeded, summary.skipped), (1, 1));
        assert!(args.output_dir.join("abc_S0_E29_L0_T0_R320_B180.mp4").exists());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("summary.json")).unwrap()).unwrap();
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["skipped"], 1);
    }

    #[test]
    fn test_config_mirrors_arguments() {
        let mut a = args(&PathBuf::from("/data"));
        a.even_crop = true;
        a.dry_run = true;
        let config = batch_config(&a);
        assert_eq!(config.num_workers, 2);
        assert!(config.even_crop && config.dry_run);
        assert_eq!(config.descriptor_file, PathBuf::from("/data/clips.txt"));
    }
}
