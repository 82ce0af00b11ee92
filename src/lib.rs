//! # dvdrip
//!
//! Dump video titles from a DVD to tagged, multiplexed files without any
//! re-encoding.
//!
//! DVDs are built to be played by machines of very little brain: menus are
//! bitmaps with jump tables, streams are sloppily labeled, and the muxed
//! data trips up general purpose tools. `dvdrip` guesses which titles are the
//! programs from the table of contents, dumps each one with `mplayer`,
//! collects its audio and subtitle languages from the dump log, and
//! re-multiplexes it with `ffmpeg -c copy`, repairing the failures it
//! recognizes by narrowing the stream selection and trying again.
//!
//! ## Quick Start
//!
//! ### Pick titles from a table of contents
//!
//! ```
//! let listing = "Title: 01, Length: 01:51:02.000\nTitle: 02, Length: 00:02:10.000";
//! assert_eq!(dvdrip::select_titles(listing, 1)?, vec![1]);
//! # Ok::<(), dvdrip::RipError>(())
//! ```
//!
//! ### Rip a movie
//!
//! ```no_run
//! use dvdrip::{ProgramTags, RipOptions, Ripper, RunTags};
//!
//! let ripper = Ripper::new(RipOptions::new().with_output_dir("movies"));
//! let ripped = ripper.rip(&[ProgramTags::new("Alien")], &RunTags::new().with_year("1979"))?;
//! println!("{}", ripped[0].output.display());
//! # Ok::<(), dvdrip::RipError>(())
//! ```
//!
//! ## Requirements
//!
//! `lsdvd`, `mplayer` and `ffmpeg` must be installed (or their paths given
//! through [`ToolPaths`]).

pub mod config;
pub mod error;
pub mod extract;
pub mod fault;
pub mod language;
pub mod metadata;
pub mod pipeline;
pub mod progress;
pub mod remux;
pub mod runner;
pub mod stream_map;
pub mod tagging;
pub mod toc;
mod utilities;

pub use config::{DEFAULT_EXTENSION, DEFAULT_MAX_ATTEMPTS, RipOptions, ToolPaths};
pub use error::RipError;
pub use extract::{describe_streams, extract_streams};
pub use fault::{ListedStream, MediaKind, RemuxFault, listed_streams};
pub use language::{Language, UnknownLanguagePolicy};
pub use metadata::{MetadataBag, MetadataKey, StreamDescriptor, StreamKind};
pub use pipeline::{ProgramTags, RippedTitle, Ripper, RunTags, program_metadata};
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo, Stage};
pub use remux::{RemuxOutcome, Remuxer};
pub use runner::{Invocation, SystemRunner, ToolOutput, ToolRunner};
pub use stream_map::{MappedStream, StreamMap};
pub use tagging::{TagDirective, language_tags};
pub use toc::{TitleEntry, parse_toc, select_titles};
pub use utilities::{FALLBACK_STEM, output_file_name, sanitize_filename};
