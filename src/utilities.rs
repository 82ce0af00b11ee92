//! Output file naming.
//!
//! Titles come from the user and routinely contain characters that are
//! awkward or illegal in file names on one platform or another.

use crate::metadata::{MetadataBag, MetadataKey};

const REMOVED: &[char] = &['?', '*', '"', '\'', '!', '<', '>', '(', ')', '|'];
const DASHED: &[char] = &[':', '/', '\\', '#'];

/// Stem used when nothing printable is left of a title.
pub const FALLBACK_STEM: &str = "untitled";

/// Make `name` safe to use as a portable file name.
///
/// Non-ASCII and control characters and `?*"'!<>()|` are removed, `:/\#`
/// become `-`, and surrounding whitespace is trimmed.
///
/// # Example
///
/// ```
/// assert_eq!(dvdrip::sanitize_filename(r#"The Show: "Pilot"?"#), "The Show- Pilot");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control() && !REMOVED.contains(c))
        .map(|c| if DASHED.contains(&c) { '-' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// File name for a remuxed title: `"<episode_id> <title>.<ext>"`, or
/// `"<title>.<ext>"` without an episode id.
pub fn output_file_name(metadata: &MetadataBag, extension: &str) -> String {
    let title = metadata.get(MetadataKey::Title).unwrap_or_default();
    let stem = match metadata.get(MetadataKey::EpisodeId) {
        Some(episode) if !episode.is_empty() => format!("{episode} {title}"),
        _ => title.to_string(),
    };

    let mut stem = sanitize_filename(&stem);
    if stem.is_empty() {
        stem = FALLBACK_STEM.to_string();
    }

    let extension = sanitize_filename(extension);
    if extension.is_empty() {
        stem
    } else {
        format!("{stem}.{extension}")
    }
}
