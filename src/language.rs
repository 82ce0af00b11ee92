//! Stream language codes.
//!
//! The dump tool reports stream languages as ISO 639-1 two-letter codes,
//! but the multiplexer only accepts ISO 639-2 three-letter codes (it
//! silently rewrites any two-letter code to `eng`). [`lookup`] translates
//! between the two for the languages found on commercial discs.
//!
//! Streams the disc does not label at all come through as the sentinel
//! `unknown`. [`lookup`] reports those as [`Language::Unknown`] and leaves
//! the decision to an [`UnknownLanguagePolicy`].
//!
//! More codes: <https://en.wikipedia.org/wiki/List_of_ISO_639-2_codes>
//!
//! # Example
//!
//! ```
//! use dvdrip::{Language, UnknownLanguagePolicy, language};
//!
//! assert_eq!(language::lookup("ja")?, Language::Known("jpn"));
//!
//! let policy = UnknownLanguagePolicy::default();
//! assert_eq!(policy.resolve(language::lookup("unknown")?)?, "eng");
//! # Ok::<(), dvdrip::RipError>(())
//! ```

use crate::error::RipError;

/// Sentinel the dump tool prints for unlabeled streams.
pub const UNKNOWN_SENTINEL: &str = "unknown";

/// Code substituted for unlabeled streams by the default policy.
pub const DEFAULT_LANGUAGE: &str = "eng";

const LANGUAGE_TABLE: [(&str, &str); 14] = [
    ("ar", "ara"), // Arabic
    ("cy", "cym"), // Welsh
    ("de", "ger"), // German
    ("en", "eng"), // English
    ("es", "spa"), // Spanish
    ("fa", "fas"), // Persian
    ("fr", "fra"), // French
    ("ga", "gle"), // Irish
    ("he", "heb"), // Hebrew
    ("ja", "jpn"), // Japanese
    ("ko", "kor"), // Korean
    ("pt", "por"), // Portuguese
    ("ru", "rus"), // Russian
    ("zh", "chi"), // Chinese
];

/// Result of a successful language lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// A three-letter code from the table.
    Known(&'static str),
    /// The stream was explicitly labeled as unknown.
    Unknown,
}

/// Translate a short language code.
///
/// # Errors
///
/// Returns [`RipError::UnrecognizedLanguage`] for any code that is neither
/// in the table nor the `unknown` sentinel.
pub fn lookup(short_code: &str) -> Result<Language, RipError> {
    if short_code == UNKNOWN_SENTINEL {
        return Ok(Language::Unknown);
    }

    LANGUAGE_TABLE
        .iter()
        .find(|(short, _)| *short == short_code)
        .map(|(_, code)| Language::Known(*code))
        .ok_or_else(|| RipError::UnrecognizedLanguage(short_code.to_string()))
}

/// The short codes the table understands, in table order.
pub fn supported_codes() -> impl Iterator<Item = &'static str> {
    LANGUAGE_TABLE.iter().map(|(short, _)| *short)
}

/// What to do with streams labeled [`Language::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownLanguagePolicy {
    /// Tag unlabeled streams with this three-letter code.
    Substitute(String),
    /// Treat unlabeled streams like any other unrecognized code.
    Reject,
}

impl Default for UnknownLanguagePolicy {
    fn default() -> Self {
        UnknownLanguagePolicy::Substitute(DEFAULT_LANGUAGE.to_string())
    }
}

impl UnknownLanguagePolicy {
    /// Turn a lookup result into the code to tag the stream with.
    ///
    /// # Errors
    ///
    /// Returns [`RipError::UnrecognizedLanguage`] for [`Language::Unknown`]
    /// under [`UnknownLanguagePolicy::Reject`].
    pub fn resolve(&self, language: Language) -> Result<String, RipError> {
        match (language, self) {
            (Language::Known(code), _) => Ok(code.to_string()),
            (Language::Unknown, UnknownLanguagePolicy::Substitute(code)) => Ok(code.clone()),
            (Language::Unknown, UnknownLanguagePolicy::Reject) => {
                Err(RipError::UnrecognizedLanguage(UNKNOWN_SENTINEL.to_string()))
            }
        }
    }
}
