// ============================================================================
// clipcrop-cli/src/main.rs
// ============================================================================
//
// CLIPCROP CLI: Main Entry Point
//
// Parses arguments, sets up colors and logging, installs the Ctrl-C handler
// and dispatches to the selected command.
//
// Exit codes: 0 when the batch ran to completion (even if some clips
// failed), 130 when it was interrupted, 1 on a fatal error.

// ---- Internal crate imports ----
use clipcrop_cli::logging::setup_logging;
use clipcrop_cli::{Cli, Commands, run_crop_command, run_probe_command, terminal};
use clipcrop_cli::error::CliResult;

// ---- External crate imports ----
use clap::Parser;
use log::{info, warn};

// ---- Standard library imports ----
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    let cli = Cli::parse();
    terminal::init_color(cli.no_color);

    let log_dir = match &cli.command {
        Commands::Crop(args) => args.log_dir.as_deref(),
        Commands::Probe(_) => None,
    };
    match setup_logging(cli.verbose, log_dir) {
        Ok(Some(path)) => info!("Log file: {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            terminal::print_error(&format!("Error: {e}"));
            1
        }
    };
    process::exit(code);
}

fn run(cli: Cli) -> CliResult<i32> {
    match cli.command {
        Commands::Crop(args) => {
            let stop = install_interrupt_handler();
            let summary = run_crop_command(&args, &stop, cli.verbose)?;
            Ok(if summary.cancelled > 0 { EXIT_INTERRUPTED } else { 0 })
        }
        Commands::Probe(args) => {
            run_probe_command(&args)?;
            Ok(0)
        }
    }
}

/// First Ctrl-C stops new clips from starting; a second one exits immediately.
fn install_interrupt_handler() -> Arc<AtomicBool> {
    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    let result = ctrlc::set_handler(move || {
        if handler_stop.swap(true, Ordering::SeqCst) {
            process::exit(EXIT_INTERRUPTED);
        }
        warn!("Interrupt received: finishing running clips, press Ctrl-C again to abort");
    });
    if let Err(e) = result {
        warn!("Could not install Ctrl-C handler: {e}");
    }
    stop
}
