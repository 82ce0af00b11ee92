//! Error types for the `dvdrip` crate.
//!
//! This module defines [`RipError`], the unified error type returned by all
//! fallible operations in the crate. Errors carry enough context to diagnose
//! a failed title without re-running it: title numbers, exit statuses, and
//! the paths of anything left behind for manual recovery.

use std::{io::Error as IoError, path::PathBuf};

use thiserror::Error;

/// The unified error type for all `dvdrip` operations.
///
/// Every public method that can fail returns `Result<T, RipError>`. Faults
/// the remuxer knows how to repair never surface here; they are handled by
/// the retry loop (see [`RemuxFault`](crate::RemuxFault)).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RipError {
    /// The table of contents listed fewer titles than were requested.
    #[error("Requested {requested} title(s) but the table of contents lists only {found}")]
    Selection {
        /// Number of titles the caller asked for.
        requested: usize,
        /// Number of title lines that could be parsed.
        found: usize,
    },

    /// The table of contents reader exited with a failure status.
    #[error("Reading the table of contents failed ({status}): {stderr}")]
    TocRead {
        /// Human readable exit status.
        status: String,
        /// Trailing standard error output of the reader.
        stderr: String,
    },

    /// A stream language code is not in the language table.
    #[error("Unrecognized language code: {0:?}")]
    UnrecognizedLanguage(String),

    /// The stream dumper exited with a failure status.
    #[error("Dump of title {title} failed ({status}): {stderr}")]
    DumpTool {
        /// Title number that was being dumped.
        title: u32,
        /// Human readable exit status.
        status: String,
        /// Trailing standard error output of the dumper.
        stderr: String,
    },

    /// The multiplexer failed in a way the retry loop cannot repair.
    ///
    /// The raw dump is kept at `dump` and the captured output of the last
    /// attempt is written to `artifacts`.
    #[error("Unrecoverable remux error: {reason} (dump kept at {})", dump.display())]
    UnrecoverableRemux {
        /// Why the retry loop gave up.
        reason: String,
        /// Path of the retained raw dump.
        dump: PathBuf,
        /// Diagnostic files written for the failed attempt.
        artifacts: Vec<PathBuf>,
    },

    /// An external tool could not be started at all.
    #[error("Failed to launch {program}: {reason}")]
    ToolLaunch {
        /// Program that was being spawned.
        program: String,
        /// Underlying reason the spawn failed.
        reason: String,
    },

    /// The caller supplied inconsistent arguments.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),
}
