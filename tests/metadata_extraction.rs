//! Language mapping and stream discovery tests.

mod common;

use common::MPLAYER_LOG;
use dvdrip::{
    Language, RipError, StreamDescriptor, StreamKind, UnknownLanguagePolicy, describe_streams,
    extract_streams, language,
};

// ── Language codes ───────────────────────────────────────────────

#[test]
fn lookup_known_codes() {
    assert_eq!(language::lookup("en").unwrap(), Language::Known("eng"));
    assert_eq!(language::lookup("de").unwrap(), Language::Known("ger"));
    assert_eq!(language::lookup("zh").unwrap(), Language::Known("chi"));
    assert_eq!(language::lookup("cy").unwrap(), Language::Known("cym"));
}

#[test]
fn every_supported_code_resolves() {
    let codes: Vec<&str> = language::supported_codes().collect();
    assert_eq!(codes.len(), 14);
    for code in codes {
        assert!(matches!(language::lookup(code), Ok(Language::Known(long)) if long.len() == 3));
    }
}

#[test]
fn lookup_unknown_sentinel() {
    assert_eq!(language::lookup("unknown").unwrap(), Language::Unknown);
}

#[test]
fn lookup_is_case_sensitive() {
    assert!(matches!(
        language::lookup("EN"),
        Err(RipError::UnrecognizedLanguage(code)) if code == "EN"
    ));
    assert!(language::lookup("xx").is_err());
    assert!(language::lookup("").is_err());
}

#[test]
fn unknown_language_policies() {
    let default = UnknownLanguagePolicy::default();
    assert_eq!(default.resolve(Language::Unknown).unwrap(), "eng");
    assert_eq!(default.resolve(Language::Known("jpn")).unwrap(), "jpn");

    let substitute = UnknownLanguagePolicy::Substitute("und".to_string());
    assert_eq!(substitute.resolve(Language::Unknown).unwrap(), "und");

    let reject = UnknownLanguagePolicy::Reject;
    assert!(reject.resolve(Language::Unknown).is_err());
    assert_eq!(reject.resolve(Language::Known("fra")).unwrap(), "fra");
}

// ── Stream discovery ─────────────────────────────────────────────

#[test]
fn extract_streams_in_log_order() {
    let streams = extract_streams(MPLAYER_LOG.lines(), &UnknownLanguagePolicy::default())
        .expect("Log should parse");

    assert_eq!(
        streams,
        vec![
            StreamDescriptor::audio("ac3:5.1", "eng"),
            StreamDescriptor::subtitle("eng"),
            StreamDescriptor::audio("ac3:stereo", "fra"),
            StreamDescriptor::subtitle("spa"),
        ]
    );
    assert_eq!(streams[1].kind, StreamKind::Subtitle);
    assert_eq!(streams[1].codec, None);
}

#[test]
fn extract_ignores_unrelated_lines() {
    let lines = ["MPlayer 1.4", "Playing dvd://1.", "", "Core dumped ;)"];
    let streams = extract_streams(lines, &UnknownLanguagePolicy::default()).unwrap();
    assert!(streams.is_empty());
}

#[test]
fn extract_accepts_indented_lines() {
    let lines = ["   audio stream: 0 format: lpcm (stereo) language: ja aid: 160."];
    let streams = extract_streams(lines, &UnknownLanguagePolicy::default()).unwrap();
    assert_eq!(streams, vec![StreamDescriptor::audio("lpcm:stereo", "jpn")]);
}

#[test]
fn extract_substitutes_unknown_languages() {
    let lines = vec![
        "subtitle ( sid ): 3 language: unknown".to_string(),
        "audio stream: 0 format: dts (5.1) language: unknown aid: 137.".to_string(),
    ];
    let streams = extract_streams(&lines, &UnknownLanguagePolicy::default()).unwrap();
    assert!(streams.iter().all(|stream| stream.language == "eng"));
}

#[test]
fn extract_fails_on_unrecognized_language() {
    let lines = ["subtitle ( sid ): 0 language: en", "subtitle ( sid ): 1 language: nl"];
    let result = extract_streams(lines, &UnknownLanguagePolicy::default());
    assert!(matches!(result, Err(RipError::UnrecognizedLanguage(code)) if code == "nl"));
}

#[test]
fn description_lists_streams() {
    let streams = [
        StreamDescriptor::audio("ac3:5.1", "eng"),
        StreamDescriptor::subtitle("fra"),
    ];
    assert_eq!(describe_streams(&streams), "audio ac3:5.1 eng/subtitle fra");
    assert_eq!(describe_streams(&[]), "");
}
