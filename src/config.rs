//! Rip configuration.
//!
//! [`RipOptions`] is a builder that threads tool locations, output
//! locations, the remux retry bound, language policy, progress callbacks and
//! cancellation tokens through the pipeline without polluting every function
//! signature.
//!
//! # Example
//!
//! ```
//! use dvdrip::{CancellationToken, RipOptions, UnknownLanguagePolicy};
//!
//! let token = CancellationToken::new();
//! let options = RipOptions::new()
//!     .with_device("/dev/sr1")
//!     .with_output_dir("rips")
//!     .with_max_attempts(3)
//!     .with_unknown_language(UnknownLanguagePolicy::Reject)
//!     .with_cancellation(token.clone());
//! assert_eq!(options.max_attempts, 3);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::language::UnknownLanguagePolicy;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Default bound on multiplexer attempts per title.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default output container extension.
pub const DEFAULT_EXTENSION: &str = "mp4";

/// Names or paths of the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    /// Table of contents reader.
    pub lsdvd: String,
    /// Stream dumper.
    pub mplayer: String,
    /// Multiplexer.
    pub ffmpeg: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            lsdvd: "lsdvd".to_string(),
            mplayer: "mplayer".to_string(),
            ffmpeg: "ffmpeg".to_string(),
        }
    }
}

/// Settings for one rip run.
#[derive(Clone)]
pub struct RipOptions {
    /// External tool locations.
    pub tools: ToolPaths,
    /// Disc device or image. `None` lets each tool use its default drive.
    pub device: Option<PathBuf>,
    /// Directory for the raw dump. Dumps are large, so this defaults to the
    /// current directory rather than the system temp directory.
    pub work_dir: PathBuf,
    /// Directory tagged output files are written to.
    pub output_dir: PathBuf,
    /// Directory diagnostic files are written to after an unrecoverable
    /// remux failure. Defaults to `output_dir`.
    pub artifact_dir: Option<PathBuf>,
    /// Output container extension, without the dot.
    pub extension: String,
    /// Maximum multiplexer runs per title.
    pub max_attempts: u32,
    /// What to do with streams labeled `unknown`.
    pub unknown_language: UnknownLanguagePolicy,
    /// Title numbers to rip instead of the automatic selection.
    pub titles: Option<Vec<u32>>,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
}

impl Debug for RipOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RipOptions")
            .field("tools", &self.tools)
            .field("device", &self.device)
            .field("work_dir", &self.work_dir)
            .field("output_dir", &self.output_dir)
            .field("artifact_dir", &self.artifact_dir)
            .field("extension", &self.extension)
            .field("max_attempts", &self.max_attempts)
            .field("unknown_language", &self.unknown_language)
            .field("titles", &self.titles)
            .field("has_cancellation", &self.cancellation.is_some())
            .finish()
    }
}

impl Default for RipOptions {
    fn default() -> Self {
        Self {
            tools: ToolPaths::default(),
            device: None,
            work_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            artifact_dir: None,
            extension: DEFAULT_EXTENSION.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            unknown_language: UnknownLanguagePolicy::default(),
            titles: None,
            progress: Arc::new(NoOpProgress),
            cancellation: None,
        }
    }
}

impl RipOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the external tool locations.
    #[must_use]
    pub fn with_tools(mut self, tools: ToolPaths) -> Self {
        self.tools = tools;
        self
    }

    /// Read from a specific disc device or image.
    #[must_use]
    pub fn with_device(mut self, device: impl Into<PathBuf>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Put the raw dump in `dir`.
    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Write tagged output files to `dir`.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Write diagnostic files to `dir`.
    #[must_use]
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }

    /// Use a different output container extension.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Bound the number of multiplexer runs per title.
    ///
    /// A value of zero is clamped to one.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Choose what happens to streams labeled `unknown`.
    #[must_use]
    pub fn with_unknown_language(mut self, policy: UnknownLanguagePolicy) -> Self {
        self.unknown_language = policy;
        self
    }

    /// Rip these titles instead of selecting by duration.
    #[must_use]
    pub fn with_titles(mut self, titles: Vec<u32>) -> Self {
        self.titles = Some(titles);
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Directory diagnostic files go to.
    pub fn artifact_dir(&self) -> &Path {
        self.artifact_dir.as_deref().unwrap_or(&self.output_dir)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}
