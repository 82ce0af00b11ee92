//! Title selection from a disc table of contents.
//!
//! DVD menus are bitmaps wired together with jump tables, so there is no
//! reliable way to ask a disc which title is "the movie". Instead the table
//! of contents (as printed by `lsdvd`) is searched for the longest titles,
//! on the assumption that menus, trailers and warnings are short.
//!
//! # Example
//!
//! ```
//! use dvdrip::toc;
//!
//! let listing = "\
//! Title: 01, Length: 00:00:10.000 Chapters: 01
//! Title: 02, Length: 00:22:31.120 Chapters: 06
//! Title: 03, Length: 00:22:48.400 Chapters: 06
//! Title: 04, Length: 00:01:02.000 Chapters: 01";
//!
//! assert_eq!(toc::select_titles(listing, 2)?, vec![2, 3]);
//! # Ok::<(), dvdrip::RipError>(())
//! ```

use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::RipError;

lazy_static! {
    static ref TITLE_LINE: Regex =
        Regex::new(r"^\s*Title:\s*(\d+),\s*Length:\s*([0-9:.]+)").expect("valid title regex");
}

/// One playable title listed in the table of contents.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleEntry {
    /// Title number as the disc numbers it.
    pub index: u32,
    /// Playing time of the title.
    pub duration: Duration,
}

impl TitleEntry {
    /// Playing time in (fractional) seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// Parse an `HH:MM:SS[.frac]` length into a [`Duration`].
///
/// `MM:SS` and bare seconds are accepted as well. Returns `None` for
/// anything else, including lengths too large for a [`Duration`].
pub fn parse_duration(value: &str) -> Option<Duration> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (h.parse::<u64>().ok()?, m.parse::<u64>().ok()?, *s),
        [m, s] => (0, m.parse::<u64>().ok()?, *s),
        [s] => (0, 0, *s),
        _ => return None,
    };

    let seconds = seconds.parse::<f64>().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }

    let whole = hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?;
    Duration::try_from_secs_f64(whole as f64 + seconds).ok()
}

/// Collect every `Title: <n>, Length: <duration>` line, in listing order.
///
/// Lines of any other shape are ignored.
pub fn parse_toc(listing: &str) -> Vec<TitleEntry> {
    listing
        .lines()
        .filter_map(|line| {
            let captures = TITLE_LINE.captures(line)?;
            let index = captures[1].parse::<u32>().ok()?;
            let duration = parse_duration(&captures[2])?;
            Some(TitleEntry { index, duration })
        })
        .collect()
}

/// Pick the `count` longest titles and return their numbers in disc order.
///
/// Titles are ranked by duration, longest first, with ties going to the
/// title listed first. The winners are then put back in ascending title
/// order, since consecutive episodes are usually consecutive titles.
///
/// # Errors
///
/// Returns [`RipError::Selection`] if the listing holds fewer than `count`
/// titles.
pub fn select_titles(listing: &str, count: usize) -> Result<Vec<u32>, RipError> {
    let entries = parse_toc(listing);
    Ok(select_entries(entries, count)?
        .into_iter()
        .map(|entry| entry.index)
        .collect())
}

/// Same as [`select_titles`], but over already parsed entries.
///
/// # Errors
///
/// Returns [`RipError::Selection`] if `entries` holds fewer than `count`
/// titles.
pub fn select_entries(
    mut entries: Vec<TitleEntry>,
    count: usize,
) -> Result<Vec<TitleEntry>, RipError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if entries.len() < count {
        return Err(RipError::Selection {
            requested: count,
            found: entries.len(),
        });
    }

    // Stable, so equal lengths keep listing order.
    entries.sort_by(|a, b| b.duration.cmp(&a.duration));
    entries.truncate(count);
    entries.sort_by_key(|entry| entry.index);
    Ok(entries)
}
