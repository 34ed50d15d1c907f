// ============================================================================
// clipcrop-cli/src/commands/probe.rs
// ============================================================================
//
// PROBE COMMAND: Show what the resolver will see for a source video

use crate::cli::ProbeArgs;
use crate::error::CliResult;
use crate::terminal;

use clipcrop_core::MediaIntrinsics;
use clipcrop_core::external::{CrateFfprobeExecutor, FfprobeExecutor};

/// Probes one file with the given executor and prints its intrinsics.
pub fn run_probe<P: FfprobeExecutor>(prober: &P, args: &ProbeArgs) -> CliResult<MediaIntrinsics> {
    let intrinsics = prober.probe(&args.file)?;

    terminal::print_section("Media info");
    terminal::print_status("File", &args.file.display().to_string());
    terminal::print_status(
        "Resolution",
        &format!("{}x{}", intrinsics.width, intrinsics.height),
    );
    terminal::print_status(
        "Frame rate",
        &format!("{} ({:.3} fps)", intrinsics.frame_rate, intrinsics.frame_rate.as_f64()),
    );
    Ok(intrinsics)
}

/// Entry point used by `main`: probes with ffprobe.
pub fn run_probe_command(args: &ProbeArgs) -> CliResult<()> {
    clipcrop_core::external::check_dependency("ffprobe")?;
    run_probe(&CrateFfprobeExecutor::new(), args).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipcrop_core::FrameRate;
    use clipcrop_core::external::mocks::MockFfprobeExecutor;
    use std::path::PathBuf;

    #[test]
    fn test_probe_returns_intrinsics() {
        let file = PathBuf::from("/videos/abc.mp4");
        let prober = MockFfprobeExecutor::new();
        let expected = MediaIntrinsics {
            width: 1920,
            height: 1080,
            frame_rate: FrameRate::new(30000, 1001).unwrap(),
        };
        prober.expect_intrinsics(&file, expected);

        let intrinsics = run_probe(&prober, &ProbeArgs { file }).unwrap();
        assert_eq!(intrinsics, expected);
    }

    #[test]
    fn test_probe_error_propagates() {
        let prober = MockFfprobeExecutor::new();
        let result = run_probe(&prober, &ProbeArgs { file: PathBuf::from("/videos/none.mp4") });
        assert!(matches!(result, Err(clipcrop_core::CoreError::Probe { .. })));
    }
}
