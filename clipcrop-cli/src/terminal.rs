// ============================================================================
// clipcrop-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: UI Components and Styling
//
// Consistent styling for everything the CLI shows to the user. Output goes
// through the `log` macros so it lands both on the console and, when
// enabled, in the run log file.
//
// Visual hierarchy:
//
// 1. Sections        ===== SECTION =====
// 2. Status lines      Label:          value
// 3. Results           ✓ success / ✗ error / ⚠ warning

// ---- External crate imports ----
use log::{error, info, warn};
use owo_colors::OwoColorize;

// ---- Standard library imports ----
use std::sync::atomic::{AtomicBool, Ordering};

// ============================================================================
// COLOR CONTROL
// ============================================================================

static USE_COLOR: AtomicBool = AtomicBool::new(false);

/// Decides once whether output is colored.
///
/// Color is used only when not disabled with `--no-color` and stderr supports
/// it (`supports-color` also honors `NO_COLOR`).
pub fn init_color(no_color: bool) {
    let supported = supports_color::on(supports_color::Stream::Stderr).is_some();
    USE_COLOR.store(!no_color && supported, Ordering::Relaxed);
}

fn should_use_color() -> bool {
    USE_COLOR.load(Ordering::Relaxed)
}

// ============================================================================
// TERMINAL COMPONENTS
// ============================================================================

const STATUS_INDENT: &str = "  ";
const LABEL_WIDTH: usize = 16;

/// Print a section header for major workflow phases
pub fn print_section(title: &str) {
    info!("");
    if should_use_color() {
        info!("===== {} =====", title.to_uppercase().cyan().bold());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
}

/// Print a status line (key-value pair)
pub fn print_status(label: &str, value: &str) {
    let label = format!("{label}:");
    if should_use_color() {
        info!("{STATUS_INDENT}{:<LABEL_WIDTH$} {}", label, value.bold());
    } else {
        info!("{STATUS_INDENT}{label:<LABEL_WIDTH$} {value}");
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    if should_use_color() {
        info!("{STATUS_INDENT}✓ {}", message.green());
    } else {
        info!("{STATUS_INDENT}✓ {message}");
    }
}

/// Print a warning message
pub fn print_warning(message: &str) {
    if should_use_color() {
        warn!("{STATUS_INDENT}⚠ {}", message.yellow());
    } else {
        warn!("{STATUS_INDENT}⚠ {message}");
    }
}

/// Print an error message
pub fn print_error(message: &str) {
    if should_use_color() {
        error!("{STATUS_INDENT}✗ {}", message.red().bold());
    } else {
        error!("{STATUS_INDENT}✗ {message}");
    }
}
