// ============================================================================
// clipcrop-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Result alias shared with the core library
//
// The CLI reports core errors as they are; the only CLI-specific addition is
// attaching context to errors from the few operations it performs itself.

// ---- Internal crate imports ----
use clipcrop_core::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::fmt;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Adds a description of what the CLI was doing to an I/O failure.
pub trait CliErrorContext<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;
}

impl<T> CliErrorContext<T> for Result<T, std::io::Error> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| CoreError::Io(std::io::Error::new(e.kind(), format!("{context}: {e}"))))
    }
}
