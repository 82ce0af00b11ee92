//! Re-multiplexing a raw dump into a tagged container.
//!
//! Getting metadata into the file means re-multiplexing all of it. The
//! cheapest way to do that is to pass every stream through ffmpeg's `copy`
//! codec, which unfortunately exposes the run to all of the demuxer's and
//! muxer's brittleness with DVD material. [`Remuxer`] therefore runs ffmpeg
//! in a loop: when a run fails with a recognized fault (see
//! [`RemuxFault`]), the stream selection is narrowed and ffmpeg is run
//! again, up to a fixed number of attempts.
//!
//! # Example
//!
//! ```no_run
//! use dvdrip::{MetadataBag, MetadataKey, Remuxer, StreamDescriptor, SystemRunner};
//!
//! let streams = [StreamDescriptor::audio("ac3:5.1", "eng")];
//! let metadata = MetadataBag::new().with(MetadataKey::Title, "Alien");
//!
//! let outcome = Remuxer::new(&SystemRunner)
//!     .output_dir("rips")
//!     .remux("dvdrip.abcdef.vob", &streams, &metadata)?;
//! println!("wrote {}", outcome.output.display());
//! # Ok::<(), dvdrip::RipError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::{DEFAULT_EXTENSION, DEFAULT_MAX_ATTEMPTS, RipOptions};
use crate::error::RipError;
use crate::fault::{RemuxFault, listed_streams};
use crate::metadata::{MetadataBag, StreamDescriptor};
use crate::progress::CancellationToken;
use crate::runner::{Invocation, ToolOutput, ToolRunner};
use crate::stream_map::StreamMap;
use crate::tagging::language_tags;
use crate::utilities::output_file_name;

/// Result of a successful remux.
#[derive(Debug, Clone)]
pub struct RemuxOutcome {
    /// Path of the tagged output file.
    pub output: PathBuf,
    /// Number of multiplexer runs it took.
    pub attempts: u32,
    /// Stream selection of the successful run.
    pub stream_map: StreamMap,
}

/// Drives the multiplexer with fault-driven retries.
pub struct Remuxer<'a, R: ToolRunner + ?Sized> {
    runner: &'a R,
    program: String,
    output_dir: PathBuf,
    artifact_dir: Option<PathBuf>,
    extension: String,
    max_attempts: u32,
    cancellation: Option<CancellationToken>,
}

impl<'a, R: ToolRunner + ?Sized> Remuxer<'a, R> {
    /// Create a remuxer that runs `ffmpeg` through `runner`.
    pub fn new(runner: &'a R) -> Self {
        Self {
            runner,
            program: "ffmpeg".to_string(),
            output_dir: PathBuf::from("."),
            artifact_dir: None,
            extension: DEFAULT_EXTENSION.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            cancellation: None,
        }
    }

    /// Create a remuxer configured from rip options.
    pub fn from_options(runner: &'a R, options: &RipOptions) -> Self {
        let mut remuxer = Self::new(runner)
            .program(options.tools.ffmpeg.clone())
            .output_dir(&options.output_dir)
            .artifact_dir(options.artifact_dir())
            .extension(options.extension.clone())
            .max_attempts(options.max_attempts);
        remuxer.cancellation = options.cancellation.clone();
        remuxer
    }

    /// Use a different multiplexer binary.
    #[must_use]
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Write the output file into `dir`.
    #[must_use]
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Write diagnostic files into `dir` (defaults to the output directory).
    #[must_use]
    pub fn artifact_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.artifact_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Output container extension.
    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Bound the number of multiplexer runs. Zero is clamped to one.
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Stop between or during runs once `token` is cancelled.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Where the output for `metadata` will be written.
    pub fn output_path(&self, metadata: &MetadataBag) -> PathBuf {
        self.output_dir.join(output_file_name(metadata, &self.extension))
    }

    /// Build the multiplexer invocation for one attempt.
    pub fn invocation(
        &self,
        dump: &Path,
        stream_map: &StreamMap,
        streams: &[StreamDescriptor],
        metadata: &MetadataBag,
    ) -> Invocation {
        let tags = language_tags(&stream_map.selected_descriptors(streams));

        Invocation::new(self.program.clone())
            // Look far enough into the dump to find every stream.
            .args(["-probesize", "200M", "-analyzeduration", "120M"])
            .arg("-i")
            .arg(dump.to_string_lossy())
            // Maps must directly follow the input.
            .args(stream_map.map_args())
            .args(["-c", "copy"])
            .arg("-y")
            .args(metadata.iter().flat_map(|(key, value)| {
                ["-metadata".to_string(), format!("{}={value}", key.as_str())]
            }))
            .args(tags.iter().flat_map(|tag| tag.to_args()))
            .arg(self.output_path(metadata).to_string_lossy())
    }

    /// Remux `dump` into a tagged output file.
    ///
    /// On success the dump is deleted; failing to delete it is only logged.
    /// On failure the dump is left in place, any partial output file is
    /// removed, and the last attempt's standard output, standard error and
    /// command line are written next to the output as `<program>.stdout`,
    /// `<program>.stderr` and `<program>.sh`.
    ///
    /// # Errors
    ///
    /// Returns [`RipError::UnrecoverableRemux`] if ffmpeg fails in an
    /// unrecognized way, a recognized fault cannot narrow the selection any
    /// further, or the attempt bound is reached. Launch failures and
    /// cancellation are passed through from the runner.
    pub fn remux(
        &self,
        dump: impl AsRef<Path>,
        streams: &[StreamDescriptor],
        metadata: &MetadataBag,
    ) -> Result<RemuxOutcome, RipError> {
        let dump = dump.as_ref();
        fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_path(metadata);
        let mut stream_map = StreamMap::everything();
        let mut attempts = 0;

        loop {
            if self
                .cancellation
                .as_ref()
                .is_some_and(CancellationToken::is_cancelled)
            {
                return Err(RipError::Cancelled);
            }

            attempts += 1;
            let invocation = self.invocation(dump, &stream_map, streams, metadata);
            info!("Remuxing {} (attempt {attempts}/{})", dump.display(), self.max_attempts);

            let output = self.runner.run(&invocation, self.cancellation.as_ref())?;
            let fault = RemuxFault::classify(output.success(), &output.stderr);

            if fault == RemuxFault::NoFault {
                info!("{} returned ok", self.program);
                info!("Deleting input file {}", dump.display());
                if let Err(error) = fs::remove_file(dump) {
                    warn!("Could not delete input file {}: {error}", dump.display());
                }
                return Ok(RemuxOutcome {
                    output: output_path,
                    attempts,
                    stream_map,
                });
            }

            warn!("{} failed: {}", self.program, output.status_description());

            let narrowed = match fault {
                RemuxFault::DropSubtitles => {
                    warn!("Subtitles cannot be represented in this container");
                    stream_map.drop_subtitles()
                }
                RemuxFault::ExcludeStream(index) => {
                    warn!("Cannot interpret stream {index}");
                    stream_map.exclude(index, &listed_streams(&output.stderr))
                }
                RemuxFault::NoFault | RemuxFault::Unclassified => false,
            };

            let reason = if !narrowed {
                match fault {
                    RemuxFault::DropSubtitles => {
                        "subtitle timestamps rejected but no subtitles are left to drop".to_string()
                    }
                    RemuxFault::ExcludeStream(index) => {
                        format!("stream {index} is unreadable but cannot be excluded")
                    }
                    _ => format!(
                        "{} failed with {} and no known repair",
                        self.program,
                        output.status_description()
                    ),
                }
            } else if attempts >= self.max_attempts {
                format!("still failing after {attempts} attempts")
            } else {
                warn!("Trying again with a narrower stream selection");
                continue;
            };

            return Err(self.give_up(reason, dump, &output_path, &invocation, &output)?);
        }
    }

    fn give_up(
        &self,
        reason: String,
        dump: &Path,
        output_path: &Path,
        invocation: &Invocation,
        output: &ToolOutput,
    ) -> Result<RipError, RipError> {
        // ffmpeg creates the output file before it fails.
        if output_path.exists() {
            warn!("Removing partial output {}", output_path.display());
            fs::remove_file(output_path)?;
        }

        let dir = self.artifact_dir.as_deref().unwrap_or(&self.output_dir);
        fs::create_dir_all(dir)?;

        let stem = Path::new(&self.program)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "remux".to_string());

        let artifacts = [
            ("stdout", output.stdout.clone()),
            ("stderr", output.stderr.clone()),
            ("sh", format!("{}\n", invocation.command_line())),
        ]
        .into_iter()
        .map(|(extension, contents)| -> Result<PathBuf, RipError> {
            let path = dir.join(format!("{stem}.{extension}"));
            fs::write(&path, contents)?;
            Ok(path)
        })
        .collect::<Result<Vec<PathBuf>, RipError>>()?;

        warn!("Unrecoverable error in {}: {reason}", self.program);
        warn!("Leaving input file {} behind", dump.display());
        warn!("Diagnostics written to {}", dir.display());

        Ok(RipError::UnrecoverableRemux {
            reason,
            dump: dump.to_path_buf(),
            artifacts,
        })
    }
}
