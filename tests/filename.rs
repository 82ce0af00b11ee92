//! Output naming and per-stream tag tests.

use dvdrip::{
    FALLBACK_STEM, MetadataBag, MetadataKey, ProgramTags, RunTags, StreamDescriptor, StreamKind,
    TagDirective, language_tags, output_file_name, program_metadata, sanitize_filename,
};

// ── Sanitization ─────────────────────────────────────────────────

#[test]
fn sanitize_strips_and_replaces() {
    assert_eq!(sanitize_filename(r#"The Show: "Pilot"?"#), "The Show- Pilot");
    assert_eq!(sanitize_filename("AC/DC #1"), "AC-DC -1");
    assert_eq!(sanitize_filename("Don't (Ever) Stop!"), "Dont Ever Stop");
    assert_eq!(sanitize_filename("a\\b|c"), "a-bc");
}

#[test]
fn sanitize_drops_non_ascii_and_controls() {
    assert_eq!(sanitize_filename("Amélie\t"), "Amlie");
    assert_eq!(sanitize_filename("  padded  "), "padded");
}

#[test]
fn sanitize_is_idempotent() {
    for name in [r#"The Show: "Pilot"?"#, "Amélie", "a/b\\c", "   "] {
        let once = sanitize_filename(name);
        assert_eq!(sanitize_filename(&once), once);
    }
}

// ── Output names ─────────────────────────────────────────────────

#[test]
fn episode_prefix_when_present() {
    let metadata = MetadataBag::new()
        .with(MetadataKey::Title, "Pilot")
        .with(MetadataKey::EpisodeId, "S01E01");
    assert_eq!(output_file_name(&metadata, "mp4"), "S01E01 Pilot.mp4");
}

#[test]
fn movie_name_is_just_the_title() {
    let metadata = MetadataBag::new().with(MetadataKey::Title, "Alien");
    assert_eq!(output_file_name(&metadata, "mkv"), "Alien.mkv");
}

#[test]
fn empty_name_falls_back() {
    let metadata = MetadataBag::new().with(MetadataKey::Title, "???");
    assert_eq!(output_file_name(&metadata, "mp4"), format!("{FALLBACK_STEM}.mp4"));
    assert_eq!(
        output_file_name(&MetadataBag::new(), "mp4"),
        format!("{FALLBACK_STEM}.mp4")
    );
}

// ── Container tags ───────────────────────────────────────────────

#[test]
fn program_metadata_for_a_movie() {
    let streams = [StreamDescriptor::audio("ac3:5.1", "eng")];
    let metadata = program_metadata(
        &ProgramTags::new("Alien"),
        &RunTags::new().with_year("1979"),
        &streams,
    );

    let pairs: Vec<(MetadataKey, &str)> = metadata.iter().collect();
    assert_eq!(
        pairs,
        vec![
            (MetadataKey::Title, "Alien"),
            (MetadataKey::Description, "audio ac3:5.1 eng"),
            (MetadataKey::Date, "1979"),
        ]
    );
    assert_eq!(metadata.get(MetadataKey::Show), None);
}

#[test]
fn empty_episode_is_ignored() {
    let program = ProgramTags::new("Alien").with_episode("");
    assert_eq!(program.episode_id, None);

    let metadata = program_metadata(&program, &RunTags::new(), &[]);
    assert_eq!(metadata.get(MetadataKey::EpisodeId), None);
    assert_eq!(metadata.len(), 2);
}

#[test]
fn insert_replaces_in_place() {
    let mut metadata = MetadataBag::new()
        .with(MetadataKey::Title, "Draft")
        .with(MetadataKey::Date, "1999");
    metadata.insert(MetadataKey::Title, "Final");

    let keys: Vec<MetadataKey> = metadata.iter().map(|(key, _)| key).collect();
    assert_eq!(keys, vec![MetadataKey::Title, MetadataKey::Date]);
    assert_eq!(metadata.get(MetadataKey::Title), Some("Final"));
}

// ── Stream language tags ─────────────────────────────────────────

#[test]
fn ordinals_count_per_kind() {
    let streams = [
        StreamDescriptor::audio("ac3:5.1", "eng"),
        StreamDescriptor::subtitle("eng"),
        StreamDescriptor::audio("ac3:stereo", "fra"),
        StreamDescriptor::subtitle("spa"),
    ];
    let selected: Vec<&StreamDescriptor> = streams.iter().collect();
    let tags = language_tags(&selected);

    assert_eq!(
        tags,
        vec![
            TagDirective { kind: StreamKind::Audio, ordinal: 0, language: "eng".into() },
            TagDirective { kind: StreamKind::Subtitle, ordinal: 0, language: "eng".into() },
            TagDirective { kind: StreamKind::Audio, ordinal: 1, language: "fra".into() },
            TagDirective { kind: StreamKind::Subtitle, ordinal: 1, language: "spa".into() },
        ]
    );
    assert_eq!(tags[3].to_args(), ["-metadata:s:s:1", "language=spa"]);
}

#[test]
fn no_streams_no_tags() {
    assert!(language_tags(&[]).is_empty());
}
