//! Progress reporting and cancellation support.
//!
//! A rip runs several slow external tools back to back. [`ProgressCallback`]
//! receives a [`ProgressInfo`] whenever the pipeline moves to a new stage,
//! and [`CancellationToken`] lets another thread (or a signal handler) stop
//! the run between or during tool invocations.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dvdrip::{ProgramTags, ProgressCallback, ProgressInfo, RipOptions, Ripper, RunTags};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("[{}/{}] {:?}", info.current, info.total, info.stage);
//!     }
//! }
//!
//! let options = RipOptions::new().with_progress(Arc::new(PrintProgress));
//! let ripper = Ripper::new(options);
//! ripper.rip(&[ProgramTags::new("Alien")], &RunTags::default())?;
//! # Ok::<(), dvdrip::RipError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// The pipeline stage currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Stage {
    /// Reading the disc table of contents.
    ReadingToc,
    /// Dumping a title to the scratch file.
    Dumping,
    /// Re-multiplexing a dump into its tagged output file.
    Remuxing,
    /// A title finished successfully.
    TitleDone,
}

/// A snapshot of pipeline progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What the pipeline is doing.
    pub stage: Stage,
    /// Disc title number being processed, once titles are selected.
    pub title: Option<u32>,
    /// Titles completed so far.
    pub current: u64,
    /// Titles selected for this run (zero until selection happens).
    pub total: u64,
    /// Wall-clock time elapsed since the run started.
    pub elapsed: Duration,
}

/// Trait for receiving progress updates during a rip.
///
/// Implementations must be [`Send`] and [`Sync`] so a callback can be shared
/// with whatever thread renders it.
///
/// Progress callbacks are **infallible**: they observe but cannot halt the
/// run. Use [`CancellationToken`] for that.
pub trait ProgressCallback: Send + Sync {
    /// Called whenever the pipeline changes stage.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications.
///
/// This is the default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone this token and share it between threads; call
/// [`cancel`](CancellationToken::cancel) from any thread to stop the run.
/// The pipeline checks it before starting each external tool, and the
/// system tool runner polls it while a tool is running.
///
/// # Example
///
/// ```
/// use dvdrip::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation.
    ///
    /// All clones of this token will observe the cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks run timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: u64,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>) -> Self {
        Self {
            callback,
            total: 0,
            current: 0,
            start_time: Instant::now(),
        }
    }

    pub(crate) fn set_total(&mut self, total: u64) {
        self.total = total;
    }

    pub(crate) fn report(&self, stage: Stage, title: Option<u32>) {
        let info = ProgressInfo {
            stage,
            title,
            current: self.current,
            total: self.total,
            elapsed: self.start_time.elapsed(),
        };
        self.callback.on_progress(&info);
    }

    /// Record one finished title.
    pub(crate) fn title_done(&mut self, title: u32) {
        self.current += 1;
        self.report(Stage::TitleDone, Some(title));
    }
}
