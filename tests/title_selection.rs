//! Table of contents parsing and title selection tests.

use std::time::Duration;

use dvdrip::{RipError, parse_toc, select_titles, toc};

fn listing(durations: &[&str]) -> String {
    durations
        .iter()
        .enumerate()
        .map(|(position, length)| {
            format!(
                "Title: {:02}, Length: {length} Chapters: 01, Cells: 01\n",
                position + 1
            )
        })
        .collect()
}

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parse_ignores_non_title_lines() {
    let text = format!(
        "Disc Title: SOME_SHOW\n{}Longest track: 02\n",
        listing(&["00:00:10.000", "01:02:03.500"])
    );
    let entries = parse_toc(&text);

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].index, 1);
    assert_eq!(entries[1].index, 2);
    assert_eq!(entries[1].duration, Duration::from_millis(3_723_500));
    assert!((entries[1].duration_seconds() - 3723.5).abs() < 1e-9);
}

#[test]
fn parse_duration_accepts_short_forms() {
    assert_eq!(toc::parse_duration("01:30.5"), Some(Duration::from_millis(90_500)));
    assert_eq!(toc::parse_duration("42"), Some(Duration::from_secs(42)));
    assert_eq!(toc::parse_duration("1:2:3:4"), None);
    assert_eq!(toc::parse_duration("aa:bb"), None);
}

#[test]
fn oversized_lengths_are_skipped() {
    let text = "\
Title: 01, Length: 00:00:99999999999999999999999 Chapters: 01
Title: 02, Length: 9999999999999999:00:00 Chapters: 01
Title: 03, Length: 00:22:00.000 Chapters: 06
";
    let entries = parse_toc(text);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].index, 3);

    assert_eq!(select_titles(text, 1).unwrap(), vec![3]);
    assert!(matches!(
        select_titles(text, 2),
        Err(RipError::Selection { requested: 2, found: 1 })
    ));
    assert_eq!(toc::parse_duration("9999999999999999:00:00"), None);
}

// ── Selection ────────────────────────────────────────────────────

#[test]
fn selects_longest_in_disc_order() {
    let text = listing(&[
        "00:00:10.000",
        "00:01:30.000",
        "00:00:45.000",
        "00:01:30.000",
        "00:00:05.000",
    ]);
    assert_eq!(select_titles(&text, 2).unwrap(), vec![2, 4]);
    assert_eq!(select_titles(&text, 3).unwrap(), vec![2, 3, 4]);
}

#[test]
fn ties_prefer_the_earlier_title() {
    let text = listing(&["00:22:00.000", "00:22:00.000", "00:22:00.000"]);
    assert_eq!(select_titles(&text, 2).unwrap(), vec![1, 2]);
}

#[test]
fn selecting_every_title_returns_all_of_them() {
    let text = listing(&["00:02:00.000", "00:01:00.000"]);
    assert_eq!(select_titles(&text, 2).unwrap(), vec![1, 2]);
}

#[test]
fn zero_count_selects_nothing() {
    let text = listing(&["00:02:00.000"]);
    assert!(select_titles(&text, 0).unwrap().is_empty());
}

#[test]
fn too_few_titles_is_an_error() {
    let text = listing(&["00:02:00.000"]);
    let result = select_titles(&text, 2);

    match result {
        Err(RipError::Selection { requested, found }) => {
            assert_eq!(requested, 2);
            assert_eq!(found, 1);
        }
        other => panic!("Expected Selection error, got: {other:?}"),
    }
}

#[test]
fn empty_listing_is_an_error() {
    assert!(matches!(
        select_titles("", 1),
        Err(RipError::Selection { found: 0, .. })
    ));
}
