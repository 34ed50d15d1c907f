// clipcrop-cli/src/lib.rs
//
// Library portion of the clipcrop CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod progress;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, CropArgs, ProbeArgs};
pub use commands::crop::run_crop_command;
pub use commands::probe::run_probe_command;
