//! End-to-end rip of a disc.
//!
//! [`Ripper`] ties the pieces together: read the table of contents, pick
//! titles, then for each title in turn dump it, discover its streams, and
//! remux it into a tagged file. Titles are processed strictly one after
//! another because they share a single scratch dump file.
//!
//! # Example
//!
//! ```no_run
//! use dvdrip::{ProgramTags, RipOptions, Ripper, RunTags};
//!
//! let programs = [
//!     ProgramTags::new("Pilot").with_episode("S01E01"),
//!     ProgramTags::new("The Second One").with_episode("S01E02"),
//! ];
//! let run = RunTags::new().with_show("Some Show").with_year("1999");
//!
//! for ripped in Ripper::new(RipOptions::new()).rip(&programs, &run)? {
//!     println!("title {} -> {}", ripped.title, ripped.output.display());
//! }
//! # Ok::<(), dvdrip::RipError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::TempPath;

use crate::config::RipOptions;
use crate::error::RipError;
use crate::extract::{describe_streams, extract_streams};
use crate::metadata::{MetadataBag, MetadataKey, StreamDescriptor};
use crate::progress::{ProgressTracker, Stage};
use crate::remux::Remuxer;
use crate::runner::{Invocation, SystemRunner, ToolOutput, ToolRunner};
use crate::toc::{self, TitleEntry};

const STDERR_TAIL_LINES: usize = 10;

/// Tags for one program on the disc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramTags {
    /// Movie or episode title.
    pub title: String,
    /// Episode identifier, for TV discs.
    pub episode_id: Option<String>,
}

impl ProgramTags {
    /// Tags for a program called `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            episode_id: None,
        }
    }

    /// Attach an episode identifier. Empty identifiers are ignored.
    #[must_use]
    pub fn with_episode(mut self, episode_id: impl Into<String>) -> Self {
        let episode_id = episode_id.into();
        self.episode_id = (!episode_id.is_empty()).then_some(episode_id);
        self
    }
}

/// Tags shared by every program in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTags {
    /// TV show name.
    pub show: Option<String>,
    /// Release year.
    pub year: Option<String>,
}

impl RunTags {
    /// No shared tags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the show name.
    #[must_use]
    pub fn with_show(mut self, show: impl Into<String>) -> Self {
        self.show = Some(show.into());
        self
    }

    /// Set the release year.
    #[must_use]
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }
}

/// A title that was ripped successfully.
#[derive(Debug, Clone)]
pub struct RippedTitle {
    /// Disc title number.
    pub title: u32,
    /// Tagged output file.
    pub output: PathBuf,
    /// Streams discovered in the dump.
    pub streams: Vec<StreamDescriptor>,
    /// Multiplexer runs it took.
    pub attempts: u32,
}

/// Container tags for one program.
///
/// Keys are added in the order `title`, `description`, `episode_id`,
/// `show`, `date`; the description lists the discovered streams.
pub fn program_metadata(
    program: &ProgramTags,
    run: &RunTags,
    streams: &[StreamDescriptor],
) -> MetadataBag {
    let mut metadata = MetadataBag::new()
        .with(MetadataKey::Title, program.title.clone())
        .with(MetadataKey::Description, describe_streams(streams));
    if let Some(episode) = &program.episode_id {
        metadata.insert(MetadataKey::EpisodeId, episode.clone());
    }
    if let Some(show) = &run.show {
        metadata.insert(MetadataKey::Show, show.clone());
    }
    if let Some(year) = &run.year {
        metadata.insert(MetadataKey::Date, year.clone());
    }
    metadata
}

/// Rips titles from a disc using external tools.
pub struct Ripper<R: ToolRunner = SystemRunner> {
    runner: R,
    options: RipOptions,
}

impl Ripper<SystemRunner> {
    /// Create a ripper that spawns the real tools.
    pub fn new(options: RipOptions) -> Self {
        Self::with_runner(SystemRunner, options)
    }
}

impl<R: ToolRunner> Ripper<R> {
    /// Create a ripper that runs tools through `runner`.
    pub fn with_runner(runner: R, options: RipOptions) -> Self {
        Self { runner, options }
    }

    /// The options this ripper was created with.
    pub fn options(&self) -> &RipOptions {
        &self.options
    }

    /// The tool runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn check_cancelled(&self) -> Result<(), RipError> {
        if self.options.is_cancelled() {
            return Err(RipError::Cancelled);
        }
        Ok(())
    }

    fn run_tool(&self, invocation: &Invocation) -> Result<ToolOutput, RipError> {
        self.check_cancelled()?;
        self.runner
            .run(invocation, self.options.cancellation.as_ref())
    }

    /// Read the raw table of contents listing.
    ///
    /// # Errors
    ///
    /// Returns [`RipError::TocRead`] if the reader fails.
    pub fn read_toc(&self) -> Result<String, RipError> {
        let mut invocation = Invocation::new(self.options.tools.lsdvd.clone());
        if let Some(device) = &self.options.device {
            invocation = invocation.arg(device.to_string_lossy());
        }

        let output = self.run_tool(&invocation)?;
        if !output.success() {
            return Err(RipError::TocRead {
                status: output.status_description(),
                stderr: stderr_tail(&output.stderr),
            });
        }
        debug!("Table of contents:\n{}", output.stdout);
        Ok(output.stdout)
    }

    /// Every title on the disc, in listing order.
    ///
    /// # Errors
    ///
    /// Returns [`RipError::TocRead`] if the reader fails.
    pub fn list_titles(&self) -> Result<Vec<TitleEntry>, RipError> {
        Ok(toc::parse_toc(&self.read_toc()?))
    }

    /// The `count` titles most likely to be the programs, in disc order.
    ///
    /// # Errors
    ///
    /// Returns [`RipError::TocRead`] if the reader fails and
    /// [`RipError::Selection`] if the disc has fewer than `count` titles.
    pub fn default_titles(&self, count: usize) -> Result<Vec<u32>, RipError> {
        let titles = toc::select_titles(&self.read_toc()?, count)?;
        info!(
            "Default titles: {}",
            titles
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        );
        Ok(titles)
    }

    /// Dump `title` to `dump` and return the streams it contains.
    ///
    /// # Errors
    ///
    /// Returns [`RipError::DumpTool`] if the dumper fails and
    /// [`RipError::UnrecognizedLanguage`] if a stream language is unknown.
    pub fn dump_title(&self, title: u32, dump: &Path) -> Result<Vec<StreamDescriptor>, RipError> {
        info!("Ripping title {title}");

        let mut invocation = Invocation::new(self.options.tools.mplayer.clone())
            .arg("-dumpstream")
            .arg(format!("dvd://{title}"));
        if let Some(device) = &self.options.device {
            invocation = invocation
                .arg("-dvd-device")
                .arg(device.to_string_lossy());
        }
        let invocation = invocation
            .args(["-nocache", "-noidx", "-dumpfile"])
            .arg(dump.to_string_lossy());
        info!("Running: {invocation}");

        let output = self.run_tool(&invocation)?;
        if !output.success() {
            return Err(RipError::DumpTool {
                title,
                status: output.status_description(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        extract_streams(output.stdout.lines(), &self.options.unknown_language)
    }

    /// Select titles, then rip one per program.
    ///
    /// Titles come from [`RipOptions::titles`] when set, otherwise from
    /// [`default_titles`](Self::default_titles).
    ///
    /// # Errors
    ///
    /// See [`rip_titles`](Self::rip_titles).
    pub fn rip(
        &self,
        programs: &[ProgramTags],
        run: &RunTags,
    ) -> Result<Vec<RippedTitle>, RipError> {
        if programs.is_empty() {
            return Err(RipError::InvalidArguments(
                "at least one program title is required".to_string(),
            ));
        }

        let titles = match &self.options.titles {
            Some(titles) => titles.clone(),
            None => {
                ProgressTracker::new(self.options.progress.clone()).report(Stage::ReadingToc, None);
                self.default_titles(programs.len())?
            }
        };
        self.rip_titles(&titles, programs, run)
    }

    /// Rip `titles[i]` as `programs[i]`, in order.
    ///
    /// The first failure stops the run. A dump that failed to remux stays at
    /// the scratch path for manual recovery; a scratch file nothing was
    /// written to is removed.
    ///
    /// # Errors
    ///
    /// Returns [`RipError::InvalidArguments`] if the counts differ, and
    /// otherwise the first error of any title.
    pub fn rip_titles(
        &self,
        titles: &[u32],
        programs: &[ProgramTags],
        run: &RunTags,
    ) -> Result<Vec<RippedTitle>, RipError> {
        if titles.len() != programs.len() {
            return Err(RipError::InvalidArguments(format!(
                "selected {} title(s) to rip, but got tags for {}",
                titles.len(),
                programs.len()
            )));
        }

        self.check_cancelled()?;
        let scratch = allocate_scratch(&self.options.work_dir)?;

        let mut tracker = ProgressTracker::new(self.options.progress.clone());
        tracker.set_total(titles.len() as u64);

        let mut ripped = Vec::with_capacity(titles.len());
        for (&title, program) in titles.iter().zip(programs) {
            match self.rip_one(title, program, run, &scratch, &tracker) {
                Ok(result) => {
                    tracker.title_done(title);
                    ripped.push(result);
                }
                Err(error) => {
                    release_scratch(scratch);
                    return Err(error);
                }
            }
        }

        Ok(ripped)
    }

    fn rip_one(
        &self,
        title: u32,
        program: &ProgramTags,
        run: &RunTags,
        dump: &Path,
        tracker: &ProgressTracker,
    ) -> Result<RippedTitle, RipError> {
        tracker.report(Stage::Dumping, Some(title));
        let streams = self.dump_title(title, dump)?;
        let metadata = program_metadata(program, run, &streams);

        tracker.report(Stage::Remuxing, Some(title));
        self.check_cancelled()?;
        let outcome =
            Remuxer::from_options(&self.runner, &self.options).remux(dump, &streams, &metadata)?;

        info!("Title {title} written to {}", outcome.output.display());
        Ok(RippedTitle {
            title,
            output: outcome.output,
            streams,
            attempts: outcome.attempts,
        })
    }
}

/// Reserve a uniquely named scratch dump in `dir`.
///
/// Dumps run to several gigabytes, so they go next to the output rather
/// than in the system temp directory.
fn allocate_scratch(dir: &Path) -> Result<TempPath, RipError> {
    fs::create_dir_all(dir)?;
    let file = tempfile::Builder::new()
        .prefix("dvdrip.")
        .suffix(".vob")
        .rand_bytes(6)
        .tempfile_in(dir)?;
    Ok(file.into_temp_path())
}

/// Keep a scratch dump that holds data; remove an empty one.
fn release_scratch(scratch: TempPath) {
    let has_data = fs::metadata(&scratch)
        .map(|metadata| metadata.len() > 0)
        .unwrap_or(false);
    if !has_data {
        return;
    }

    match scratch.keep() {
        Ok(path) => warn!("Leaving dump {} behind", path.display()),
        Err(error) => warn!("Could not keep dump: {error}"),
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n").trim().to_string()
}
