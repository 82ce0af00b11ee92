//! Classification of multiplexer failures.
//!
//! Re-multiplexing a DVD dump through `ffmpeg -c copy` exposes every quirk
//! of its demuxer and muxer. Two failures are common enough and well enough
//! understood to repair automatically; both are recognized by fixed text in
//! ffmpeg's standard error. Everything here is pure text processing so it can
//! be tested without spawning a process.
//!
//! If ffmpeg ever changes its wording, classification degrades to
//! [`RemuxFault::Unclassified`], which the remuxer treats as terminal.

use lazy_static::lazy_static;
use regex::Regex;

const NON_MONOTONIC_DTS: &str = "non monotonically increasing dts";

lazy_static! {
    static ref CODEC_PARAMETERS: Regex =
        Regex::new(r"Could not find codec parameters for stream (\d+)")
            .expect("valid codec parameters regex");
    static ref LISTED_STREAM: Regex =
        Regex::new(r"Stream #0:(\d+)(?:\S*:\s+(\w+))?").expect("valid stream listing regex");
}

/// Outcome of inspecting one multiplexer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemuxFault {
    /// The run succeeded.
    NoFault,
    /// Subtitle timestamps cannot be represented in the target container.
    DropSubtitles,
    /// The multiplexer could not identify the codec of this input stream.
    ExcludeStream(usize),
    /// A failure with no known repair.
    Unclassified,
}

impl RemuxFault {
    /// Inspect a finished run.
    ///
    /// Signatures are checked in priority order: timestamp trouble first,
    /// then unidentifiable streams.
    pub fn classify(succeeded: bool, stderr: &str) -> Self {
        if succeeded {
            return RemuxFault::NoFault;
        }
        if stderr.contains(NON_MONOTONIC_DTS) {
            return RemuxFault::DropSubtitles;
        }
        CODEC_PARAMETERS
            .captures(stderr)
            .and_then(|captures| captures[1].parse::<usize>().ok())
            .map_or(RemuxFault::Unclassified, RemuxFault::ExcludeStream)
    }

    /// Whether the retry loop knows a repair for this fault.
    pub fn is_recoverable(self) -> bool {
        matches!(self, RemuxFault::DropSubtitles | RemuxFault::ExcludeStream(_))
    }
}

/// Media type of a stream as the multiplexer lists it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Video stream.
    Video,
    /// Audio stream.
    Audio,
    /// Subtitle stream.
    Subtitle,
    /// Data stream (e.g. DVD navigation packets).
    Data,
    /// Anything else, or a line without a type.
    Other,
}

impl MediaKind {
    fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("Video") => MediaKind::Video,
            Some("Audio") => MediaKind::Audio,
            Some("Subtitle") => MediaKind::Subtitle,
            Some("Data") => MediaKind::Data,
            _ => MediaKind::Other,
        }
    }
}

/// One input stream from the multiplexer's own listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListedStream {
    /// Stream index within the input file (`#0:<index>`).
    pub index: usize,
    /// Media type.
    pub kind: MediaKind,
}

/// Read the input stream listing from multiplexer diagnostics.
///
/// Only the input section is read: parsing stops at the first line that
/// starts describing the output (`Stream mapping:` or `Output #0`). Each
/// index is reported once, in listing order.
pub fn listed_streams(stderr: &str) -> Vec<ListedStream> {
    let mut streams: Vec<ListedStream> = Vec::new();

    for line in stderr.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("Output #0") || trimmed.starts_with("Stream mapping:") {
            break;
        }

        let Some(captures) = LISTED_STREAM.captures(line) else {
            continue;
        };
        let Ok(index) = captures[1].parse::<usize>() else {
            continue;
        };
        if streams.iter().any(|stream| stream.index == index) {
            continue;
        }

        let kind = MediaKind::from_label(captures.get(2).map(|label| label.as_str()));
        streams.push(ListedStream { index, kind });
    }

    streams
}
