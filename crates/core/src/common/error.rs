//! Error taxonomy for the prefetcher simulator.
//!
//! This module defines the fatal error conditions of a run. It covers:
//! 1. **Configuration errors:** malformed geometry (non-power-of-two page or
//!    line sizes, too-narrow signatures) and undecodable config files.
//! 2. **Input errors:** a missing trace file or a malformed trace line.
//! 3. **Output errors:** I/O failures while writing the prediction streams.
//!
//! Two conditions are deliberately *not* represented here. A lookup miss in
//! the reward tracker is a normal outcome, not an error. A structural
//! invariant violation (more than one exact match in the tracker) is a
//! programming bug and fails fast via `assert!` rather than propagating.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors surfaced by the simulator core.
///
/// All variants terminate the run; none are retried. The CLI maps any of
/// these to a diagnostic message and a non-zero exit status.
#[derive(Debug, Error)]
pub enum QfetchError {
    /// Invalid configuration value (non-power-of-two sizes, bad bit widths,
    /// empty file names). Detected at construction time, before any trace
    /// processing starts.
    #[error("configuration error: {0}")]
    Config(String),

    /// The configuration file could not be read or decoded as JSON.
    #[error("failed to parse config file '{path}': {reason}")]
    ConfigParse {
        /// Path of the offending config file.
        path: PathBuf,
        /// Underlying read or decode failure.
        reason: String,
    },

    /// The trace file does not exist or could not be opened.
    #[error("trace file '{path}' could not be opened: {source}")]
    TraceNotFound {
        /// Path of the missing trace file.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// A trace line did not match the expected column layout.
    #[error("malformed trace line {line}: {reason}")]
    TraceFormat {
        /// 1-based line number within the trace file.
        line: usize,
        /// Human-readable description of the mismatch.
        reason: String,
    },

    /// I/O failure while creating or writing the output streams.
    #[error("output I/O error: {0}")]
    Io(#[from] io::Error),
}
