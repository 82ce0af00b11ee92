//! The set of input streams carried into the remuxed file.
//!
//! A [`StreamMap`] starts out selecting everything in the dump and is only
//! ever narrowed, by the remuxer, in response to a classified fault. It
//! renders to the multiplexer's `-map` arguments and decides which
//! [`StreamDescriptor`]s still need a language tag.

use crate::fault::{ListedStream, MediaKind};
use crate::metadata::{StreamDescriptor, StreamKind};

/// A listed input stream kept by an explicit map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedStream {
    /// Input stream index (`#0:<index>`).
    pub index: usize,
    /// Media type from the listing.
    pub kind: MediaKind,
    /// Position among listed streams of the same kind, counting excluded ones.
    pub kind_position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    Everything,
    WithoutSubtitles,
    Explicit(Vec<MappedStream>),
}

/// Streams currently selected for output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMap {
    selection: Selection,
}

impl Default for StreamMap {
    fn default() -> Self {
        Self::everything()
    }
}

impl StreamMap {
    /// Select every stream in the input.
    pub fn everything() -> Self {
        Self {
            selection: Selection::Everything,
        }
    }

    /// Whether any subtitle stream can still reach the output.
    pub fn includes_subtitles(&self) -> bool {
        match &self.selection {
            Selection::Everything => true,
            Selection::WithoutSubtitles => false,
            Selection::Explicit(streams) => streams
                .iter()
                .any(|stream| stream.kind == MediaKind::Subtitle),
        }
    }

    /// Explicitly selected input indices, or `None` for a kind-based map.
    pub fn indices(&self) -> Option<Vec<usize>> {
        match &self.selection {
            Selection::Explicit(streams) => {
                Some(streams.iter().map(|stream| stream.index).collect())
            }
            _ => None,
        }
    }

    fn selects(&self, stream: &ListedStream) -> bool {
        match &self.selection {
            Selection::Everything => true,
            Selection::WithoutSubtitles => {
                matches!(stream.kind, MediaKind::Video | MediaKind::Audio)
            }
            Selection::Explicit(streams) => streams.iter().any(|kept| kept.index == stream.index),
        }
    }

    /// Remove every subtitle stream.
    ///
    /// Returns `false` if the map held no subtitles to begin with.
    pub fn drop_subtitles(&mut self) -> bool {
        if self.selection == Selection::Everything {
            self.selection = Selection::WithoutSubtitles;
            return true;
        }

        match &mut self.selection {
            Selection::Everything | Selection::WithoutSubtitles => false,
            Selection::Explicit(streams) => {
                let before = streams.len();
                streams.retain(|stream| stream.kind != MediaKind::Subtitle);
                streams.len() != before
            }
        }
    }

    /// Rebuild the map from the multiplexer's input listing without `index`.
    ///
    /// Streams this map already excluded stay excluded. Returns `false`,
    /// leaving the map untouched, if `index` is not currently selected or not
    /// in the listing.
    pub fn exclude(&mut self, index: usize, listing: &[ListedStream]) -> bool {
        let Some(target) = listing.iter().find(|stream| stream.index == index) else {
            return false;
        };
        if !self.selects(target) {
            return false;
        }

        let mut positions = KindCounter::default();
        let mut kept = Vec::new();
        for stream in listing {
            let kind_position = positions.next(stream.kind);
            if stream.index != index && self.selects(stream) {
                kept.push(MappedStream {
                    index: stream.index,
                    kind: stream.kind,
                    kind_position,
                });
            }
        }

        self.selection = Selection::Explicit(kept);
        true
    }

    /// Render as multiplexer `-map` arguments for input `0`.
    pub fn map_args(&self) -> Vec<String> {
        match &self.selection {
            Selection::Everything => vec!["-map".to_string(), "0".to_string()],
            Selection::WithoutSubtitles => ["-map", "0:v", "-map", "0:a"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            Selection::Explicit(streams) => streams
                .iter()
                .flat_map(|stream| ["-map".to_string(), format!("0:{}", stream.index)])
                .collect(),
        }
    }

    /// The descriptors whose streams this map carries, in output order.
    ///
    /// Explicit maps pair the n-th listed audio (subtitle) stream with the
    /// n-th audio (subtitle) descriptor.
    pub fn selected_descriptors<'a>(
        &self,
        descriptors: &'a [StreamDescriptor],
    ) -> Vec<&'a StreamDescriptor> {
        match &self.selection {
            Selection::Everything => descriptors.iter().collect(),
            Selection::WithoutSubtitles => descriptors
                .iter()
                .filter(|descriptor| descriptor.kind != StreamKind::Subtitle)
                .collect(),
            Selection::Explicit(streams) => streams
                .iter()
                .filter_map(|stream| {
                    let kind = match stream.kind {
                        MediaKind::Audio => StreamKind::Audio,
                        MediaKind::Subtitle => StreamKind::Subtitle,
                        _ => return None,
                    };
                    descriptors
                        .iter()
                        .filter(|descriptor| descriptor.kind == kind)
                        .nth(stream.kind_position)
                })
                .collect(),
        }
    }
}

#[derive(Default)]
struct KindCounter {
    counts: Vec<(MediaKind, usize)>,
}

impl KindCounter {
    fn next(&mut self, kind: MediaKind) -> usize {
        match self.counts.iter_mut().find(|(counted, _)| *counted == kind) {
            Some((_, count)) => {
                let position = *count;
                *count += 1;
                position
            }
            None => {
                self.counts.push((kind, 1));
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Vec<ListedStream> {
        [
            (0, MediaKind::Video),
            (1, MediaKind::Audio),
            (2, MediaKind::Audio),
            (3, MediaKind::Subtitle),
            (4, MediaKind::Subtitle),
        ]
        .into_iter()
        .map(|(index, kind)| ListedStream { index, kind })
        .collect()
    }

    #[test]
    fn dropping_subtitles_twice_is_refused() {
        let mut map = StreamMap::everything();
        assert!(map.drop_subtitles());
        assert!(!map.includes_subtitles());
        assert!(!map.drop_subtitles());
    }

    #[test]
    fn exclusion_keeps_kind_positions() {
        let mut map = StreamMap::everything();
        assert!(map.exclude(3, &listing()));
        assert_eq!(map.indices(), Some(vec![0, 1, 2, 4]));

        let descriptors = [
            StreamDescriptor::subtitle("eng"),
            StreamDescriptor::subtitle("spa"),
        ];
        let selected = map.selected_descriptors(&descriptors);
        assert_eq!(selected, vec![&descriptors[1]]);
    }

    #[test]
    fn exclusion_after_dropping_subtitles_stays_narrow() {
        let mut map = StreamMap::everything();
        map.drop_subtitles();
        assert!(map.exclude(2, &listing()));
        assert_eq!(map.indices(), Some(vec![0, 1]));
        assert_eq!(map.map_args(), ["-map", "0:0", "-map", "0:1"]);
    }

    #[test]
    fn excluding_an_unselected_stream_is_refused() {
        let mut map = StreamMap::everything();
        map.drop_subtitles();
        assert!(!map.exclude(3, &listing()));
        assert!(!map.exclude(9, &listing()));
        assert_eq!(map.indices(), None);
    }

    #[test]
    fn explicit_map_can_still_drop_subtitles() {
        let mut map = StreamMap::everything();
        map.exclude(1, &listing());
        assert!(map.drop_subtitles());
        assert_eq!(map.indices(), Some(vec![0, 2]));
        assert!(!map.drop_subtitles());
    }
}
