//! Stream and container metadata types.
//!
//! [`StreamDescriptor`] describes one audio or subtitle stream found in a
//! raw dump, as reported by the dump tool. [`MetadataBag`] holds the
//! container-level tags written into the remuxed file.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Kind of an elementary stream that carries a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// An audio track.
    Audio,
    /// A subtitle (sub-picture) track.
    Subtitle,
}

impl StreamKind {
    /// Stream specifier letter used by the multiplexer (`a` or `s`).
    pub fn specifier(self) -> &'static str {
        match self {
            StreamKind::Audio => "a",
            StreamKind::Subtitle => "s",
        }
    }
}

impl Display for StreamKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StreamKind::Audio => write!(f, "audio"),
            StreamKind::Subtitle => write!(f, "subtitle"),
        }
    }
}

/// Metadata for one stream of a raw dump.
///
/// Descriptors are produced by [`extract_streams`](crate::extract_streams)
/// in the order the dump tool first reported them, audio and subtitle
/// streams interleaved.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct StreamDescriptor {
    /// Audio or subtitle.
    pub kind: StreamKind,
    /// Codec as `format:subformat` (e.g. `"ac3:5.1"`). Subtitles have none.
    pub codec: Option<String>,
    /// ISO 639-2 language code (e.g. `"eng"`).
    pub language: String,
}

impl StreamDescriptor {
    /// Describe an audio stream.
    pub fn audio(codec: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            kind: StreamKind::Audio,
            codec: Some(codec.into()),
            language: language.into(),
        }
    }

    /// Describe a subtitle stream.
    pub fn subtitle(language: impl Into<String>) -> Self {
        Self {
            kind: StreamKind::Subtitle,
            codec: None,
            language: language.into(),
        }
    }
}

impl Display for StreamDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.codec {
            Some(codec) => write!(f, "{} {codec} {}", self.kind, self.language),
            None => write!(f, "{} {}", self.kind, self.language),
        }
    }
}

/// Container-level tag keys understood by the MP4 muxer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    /// Movie or episode title.
    Title,
    /// Free text; filled with a summary of the streams.
    Description,
    /// Release year.
    Date,
    /// Name of the TV show.
    Show,
    /// Episode identifier such as `S01E02`.
    EpisodeId,
}

impl MetadataKey {
    /// Key name as passed to the multiplexer.
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataKey::Title => "title",
            MetadataKey::Description => "description",
            MetadataKey::Date => "date",
            MetadataKey::Show => "show",
            MetadataKey::EpisodeId => "episode_id",
        }
    }
}

/// Container tags for one output file, in insertion order.
///
/// Setting a key twice replaces the earlier value in place.
///
/// # Example
///
/// ```
/// use dvdrip::{MetadataBag, MetadataKey};
///
/// let bag = MetadataBag::new()
///     .with(MetadataKey::Title, "Pilot")
///     .with(MetadataKey::EpisodeId, "S01E01");
/// assert_eq!(bag.get(MetadataKey::Title), Some("Pilot"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataBag {
    entries: Vec<(MetadataKey, String)>,
}

impl MetadataBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`.
    #[must_use]
    pub fn with(mut self, key: MetadataKey, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key` to `value` in place.
    pub fn insert(&mut self, key: MetadataKey, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up the value for `key`.
    pub fn get(&self, key: MetadataKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (MetadataKey, &str)> {
        self.entries.iter().map(|(key, value)| (*key, value.as_str()))
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag holds no tags.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
