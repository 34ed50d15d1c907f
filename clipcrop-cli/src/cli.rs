// ============================================================================
// clipcrop-cli/src/cli.rs
// ============================================================================
//
// COMMAND LINE INTERFACE: Argument Parsing and Command Structure
//
// This module defines the command-line interface for clipcrop using clap's
// derive API.
//
// KEY COMPONENTS:
// - Cli: Top-level parser with global flags
// - Commands: Available subcommands (crop, probe)
// - CropArgs: Batch clip extraction arguments
// - ProbeArgs: Single-file inspection arguments

// ---- External crate imports ----
use clap::builder::TypedValueParser as _;
use clap::{Parser, Subcommand};
use clipcrop_core::config::{DEFAULT_NUM_WORKERS, DEFAULT_SAMPLE_RATE};

// ---- Standard library imports ----
use std::path::PathBuf;

// ============================================================================
// MAIN CLI STRUCTURE
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Clipcrop: batch clip trimming and cropping",
    long_about = "Cuts clips described by a descriptor file out of source videos, \
                  rescaling each crop box to the source resolution, using ffmpeg."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output for troubleshooting
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

// ============================================================================
// SUBCOMMANDS
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extracts every clip listed in a descriptor file
    Crop(CropArgs),

    /// Prints the resolution and frame rate ffprobe reports for a video
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
pub struct CropArgs {
    /// Directory containing the source videos (<name>.mp4)
    #[arg(long, value_name = "DIR", env = "CLIPCROP_INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Descriptor file, one `name,H,W,S,E,L,T,R,B` record per line
    #[arg(long, value_name = "FILE")]
    pub clip_info_file: PathBuf,

    /// Directory where clips are written (created if missing)
    #[arg(long, value_name = "DIR", env = "CLIPCROP_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Number of clips processed concurrently
    #[arg(long, value_name = "N", default_value_t = DEFAULT_NUM_WORKERS,
          value_parser = clap::value_parser!(u16).range(1..).map(usize::from))]
    pub num_workers: usize,

    /// Output audio sample rate in Hz
    #[arg(long, value_name = "HZ", default_value_t = DEFAULT_SAMPLE_RATE,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub sample_rate: u32,

    /// Shrink odd crop dimensions by one pixel so they are even
    #[arg(long)]
    pub even_crop: bool,

    /// Resolve every clip and print the ffmpeg commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Write the batch summary as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub summary_json: Option<PathBuf>,

    /// Also write a debug-level log file into this directory
    #[arg(short, long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// Video file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}
