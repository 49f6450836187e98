//! Tests for the C++ engine.
//!
//! Tests that need a working compiler return early when `g++` is absent.

use openregex_core::{EngineError, Group, Span, run_match};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

struct Compiled {
    _assets: TempDir,
    engine: CxxEngine,
}

fn compiler_available() -> bool {
    toolchain::capture("g++", ["--version"]).is_ok_and(|output| output.status.success())
}

#[fixture]
fn compiled() -> Option<Compiled> {
    if !compiler_available() {
        return None;
    }
    let assets = TempDir::new().expect("temp dir");
    let engine = CxxEngine::new(&EngineSettings::new(assets.path()));
    assert!(engine.library.is_ok(), "shim should compile: {:?}", engine.library);
    Some(Compiled {
        _assets: assets,
        engine,
    })
}

#[test]
fn missing_compiler_makes_engine_unavailable() {
    let assets = TempDir::new().expect("temp dir");
    let settings =
        EngineSettings::new(assets.path()).with_cxx_compiler("openregex-missing-compiler");
    let engine = CxxEngine::new(&settings);
    assert_eq!(engine.version(), "g++ version not found");
    let err = engine
        .raw_match("a", "a", 0)
        .expect_err("setup failure should surface");
    assert!(matches!(err, EngineError::Unavailable { .. }));
    assert!(err.to_string().contains("openregex-missing-compiler"));
}

#[test]
fn give_up_is_described_as_a_timeout() {
    let assets = TempDir::new().expect("temp dir");
    let settings = EngineSettings::new(assets.path()).with_cxx_compiler("openregex-missing-compiler");
    let engine = CxxEngine::new(&settings);
    assert_eq!(engine.describe_error(&EngineError::NativeGiveUp), "Regex timeout");
}

#[rstest]
fn finds_capitalised_words(compiled: Option<Compiled>) {
    let Some(fixture) = compiled else { return };
    let outcome = run_match(&fixture.engine, r"[A-Z]\w+", "Hello, World!", 0);
    assert_eq!(outcome.error(), "");
    let spans: Vec<Span> = outcome.matches().iter().map(Match::span).collect();
    assert_eq!(spans, [Span::new(0, 5), Span::new(7, 12)]);
    assert!(fixture.engine.version().starts_with("g++ - "));
}

#[rstest]
fn reports_groups_in_character_offsets(compiled: Option<Compiled>) {
    let Some(fixture) = compiled else { return };
    let outcome = run_match(&fixture.engine, "(ö)(x)?", "wörld", 0);
    let found = outcome.matches().first().expect("match");
    assert_eq!(found.span(), Span::new(1, 2));
    assert_eq!(
        found.groups(),
        [Group::new("", "ö", Span::new(1, 2)), Group::unmatched("")]
    );
}

#[rstest]
fn invalid_pattern_reports_library_message(compiled: Option<Compiled>) {
    let Some(fixture) = compiled else { return };
    let outcome = run_match(&fixture.engine, "(unclosed", "text", 0);
    assert!(outcome.matches().is_empty());
    assert!(!outcome.error().is_empty());
}

#[rstest]
fn ignorecase_flag_is_forwarded(compiled: Option<Compiled>) {
    let Some(fixture) = compiled else { return };
    let outcome = run_match(&fixture.engine, "hello", "HELLO", flags::IGNORECASE);
    assert_eq!(outcome.matches().len(), 1);
}

#[rstest]
fn second_instance_reuses_the_library(compiled: Option<Compiled>) {
    let Some(fixture) = compiled else { return };
    let library = fixture.engine.library.as_ref().expect("compiled").clone();
    let modified = std::fs::metadata(&library)
        .and_then(|meta| meta.modified())
        .expect("metadata");
    let assets_root = library
        .parent()
        .and_then(Path::parent)
        .expect("assets root");
    let again = CxxEngine::new(&EngineSettings::new(assets_root));
    assert_eq!(again.library.as_ref().ok(), Some(&library));
    let after = std::fs::metadata(&library)
        .and_then(|meta| meta.modified())
        .expect("metadata");
    assert_eq!(modified, after);
}

#[rstest]
#[case::inside_a_character(1, 2, (1, 3), "é")]
#[case::straddling_two(2, 4, (1, 4), "éb")]
#[case::already_aligned(0, 1, (0, 1), "h")]
#[case::empty_at_boundary(3, 3, (3, 3), "")]
fn byte_ranges_widen_to_whole_characters(
    #[case] start: usize,
    #[case] end: usize,
    #[case] expected: (usize, usize),
    #[case] slice: &str,
) {
    let capture = byte_capture("hébc", start, end).expect("in range");
    assert_eq!((capture.start, capture.end), expected);
    assert_eq!(capture.text, slice);
}

#[rstest]
#[case::past_the_end(2, 9)]
#[case::reversed(3, 1)]
fn impossible_ranges_are_protocol_errors(#[case] start: usize, #[case] end: usize) {
    let err = byte_capture("hébc", start, end).expect_err("invalid range");
    assert!(matches!(err, EngineError::Protocol { .. }), "{err:?}");
}

#[rstest]
fn multibyte_matches_cover_whole_characters(compiled: Option<Compiled>) {
    let Some(compiled) = compiled else { return };
    let outcome = run_match(&compiled.engine, ".", "hé", 0);
    assert_eq!(outcome.error(), "");
    let texts: Vec<_> = outcome.matches().iter().map(Match::text).collect();
    assert_eq!(texts, ["h", "é"]);
    let spans: Vec<_> = outcome.matches().iter().map(Match::span).collect();
    assert_eq!(spans, [Span::new(0, 1), Span::new(1, 2)]);
}
