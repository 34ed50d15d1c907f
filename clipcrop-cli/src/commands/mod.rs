//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Batch clip extraction from a descriptor file.
pub mod crop;

/// Inspection of a single source video.
pub mod probe;
