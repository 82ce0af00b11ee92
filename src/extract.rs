//! Stream discovery from the dump tool's console log.
//!
//! While dumping a title, `mplayer` prints one line per audio and subtitle
//! stream it finds:
//!
//! ```text
//! audio stream: 0 format: ac3 (5.1) language: en aid: 128.
//! subtitle ( sid ): 0 language: fr
//! ```
//!
//! [`extract_streams`] turns those lines into [`StreamDescriptor`]s and
//! ignores everything else.

use lazy_static::lazy_static;
use log::info;
use regex::Regex;

use crate::error::RipError;
use crate::language::{self, UnknownLanguagePolicy};
use crate::metadata::StreamDescriptor;

lazy_static! {
    static ref AUDIO_LINE: Regex =
        Regex::new(r"^audio stream: \d+ format: ([\w.]+) \(([\w.]+)\) language: (\w+)")
            .expect("valid audio stream regex");
    static ref SUBTITLE_LINE: Regex =
        Regex::new(r"^subtitle \( sid \): \d+ language: (\w+)").expect("valid subtitle regex");
}

/// Parse a dump log into stream descriptors, in the order they appear.
///
/// Each discovered stream is announced with an `info` log record.
///
/// # Errors
///
/// Returns [`RipError::UnrecognizedLanguage`] as soon as a stream carries a
/// language code that neither the table nor `policy` can resolve.
///
/// # Example
///
/// ```
/// use dvdrip::{StreamKind, UnknownLanguagePolicy, extract_streams};
///
/// let log = [
///     "Playing dvd://2.",
///     "audio stream: 0 format: ac3 (5.1) language: en aid: 128.",
///     "subtitle ( sid ): 0 language: es",
/// ];
/// let streams = extract_streams(log, &UnknownLanguagePolicy::default())?;
/// assert_eq!(streams.len(), 2);
/// assert_eq!(streams[1].kind, StreamKind::Subtitle);
/// assert_eq!(streams[1].language, "spa");
/// # Ok::<(), dvdrip::RipError>(())
/// ```
pub fn extract_streams<I, S>(
    lines: I,
    policy: &UnknownLanguagePolicy,
) -> Result<Vec<StreamDescriptor>, RipError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut streams = Vec::new();

    for line in lines {
        let line = line.as_ref().trim();

        let stream = if let Some(captures) = AUDIO_LINE.captures(line) {
            let language = policy.resolve(language::lookup(&captures[3])?)?;
            StreamDescriptor::audio(format!("{}:{}", &captures[1], &captures[2]), language)
        } else if let Some(captures) = SUBTITLE_LINE.captures(line) {
            let language = policy.resolve(language::lookup(&captures[1])?)?;
            StreamDescriptor::subtitle(language)
        } else {
            continue;
        };

        info!("Spotted stream: {stream}");
        streams.push(stream);
    }

    Ok(streams)
}

/// Summarize streams for the container `description` tag.
///
/// Produces `"audio ac3:5.1 eng/subtitle fra"` style text.
pub fn describe_streams(streams: &[StreamDescriptor]) -> String {
    streams
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/")
}
