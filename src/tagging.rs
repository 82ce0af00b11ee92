//! Per-stream language tags.
//!
//! The output container numbers audio and subtitle streams separately, each
//! starting from zero, so a stream's tag is addressed by its position among
//! selected streams of the same kind, not by its input index.

use crate::metadata::{StreamDescriptor, StreamKind};

/// One `-metadata:s:<kind>:<ordinal> language=<code>` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDirective {
    /// Audio or subtitle.
    pub kind: StreamKind,
    /// Position among selected streams of the same kind.
    pub ordinal: usize,
    /// ISO 639-2 language code.
    pub language: String,
}

impl TagDirective {
    /// Render as multiplexer arguments.
    pub fn to_args(&self) -> [String; 2] {
        [
            format!("-metadata:s:{}:{}", self.kind.specifier(), self.ordinal),
            format!("language={}", self.language),
        ]
    }
}

/// Build tag directives for the selected streams, in selection order.
///
/// # Example
///
/// ```
/// use dvdrip::{StreamDescriptor, language_tags};
///
/// let streams = [
///     StreamDescriptor::audio("ac3:5.1", "eng"),
///     StreamDescriptor::subtitle("fra"),
///     StreamDescriptor::audio("ac3:stereo", "spa"),
/// ];
/// let selected: Vec<&StreamDescriptor> = streams.iter().collect();
/// let tags = language_tags(&selected);
/// assert_eq!(tags[2].ordinal, 1);
/// assert_eq!(tags[2].to_args()[0], "-metadata:s:a:1");
/// ```
pub fn language_tags(selected: &[&StreamDescriptor]) -> Vec<TagDirective> {
    let mut audio = 0;
    let mut subtitle = 0;

    selected
        .iter()
        .map(|descriptor| {
            let counter = match descriptor.kind {
                StreamKind::Audio => &mut audio,
                StreamKind::Subtitle => &mut subtitle,
            };
            let ordinal = *counter;
            *counter += 1;
            TagDirective {
                kind: descriptor.kind,
                ordinal,
                language: descriptor.language.clone(),
            }
        })
        .collect()
}
