//! Crate-level tests for the match model, offset index, and engine contract.

use std::time::Duration;

use rstest::{fixture, rstest};
use serde_json::json;

use crate::engine::{RegexEngine, run_match};
use crate::flags;
use crate::model::{ExecutionResult, Group, Match, MatchOutcome, Span, Termination};
use crate::registry::EngineRegistry;
use crate::test_support::StubEngine;
use crate::text_index::TextIndex;

#[fixture]
fn stub() -> StubEngine {
    StubEngine::new("stub")
}

// ---------------------------------------------------------------------------
// Span
// ---------------------------------------------------------------------------

#[rstest]
#[case::ascii("Hello, World!", Span::new(7, 12), Some("World"))]
#[case::multibyte("héllo wörld", Span::new(6, 11), Some("wörld"))]
#[case::empty_at_end("abc", Span::new(3, 3), Some(""))]
#[case::past_end("abc", Span::new(2, 4), None)]
#[case::inverted("abc", Span::new(2, 1), None)]
fn span_extract(#[case] text: &str, #[case] span: Span, #[case] expected: Option<&str>) {
    assert_eq!(span.extract(text), expected);
}

#[rstest]
#[case(Span::new(0, 0), 0, true)]
#[case(Span::new(0, 5), 5, true)]
#[case(Span::new(0, 6), 5, false)]
#[case(Span::new(3, 2), 5, false)]
fn span_fits(#[case] span: Span, #[case] len: usize, #[case] expected: bool) {
    assert_eq!(span.fits(len), expected);
}

#[test]
fn group_serialises_absent_span_as_empty_array() {
    let group = Group::unmatched("word");
    let value = serde_json::to_value(&group).expect("serialise");
    assert_eq!(value, json!({ "name": "word", "value": "", "span": [] }));
}

#[test]
fn match_wire_format_reads_helper_output() {
    let raw = json!({
        "text": "Hello",
        "span": [0, 5],
        "groups": [
            { "name": "name", "value": "Hello", "span": [0, 5] },
            { "name": "", "value": "", "span": [] }
        ]
    });
    let parsed: Match = serde_json::from_value(raw).expect("deserialise");
    assert_eq!(parsed.span(), Span::new(0, 5));
    assert_eq!(parsed.groups().len(), 2);
    assert_eq!(parsed.groups().get(1).and_then(Group::span), None);
}

#[test]
fn span_rejects_wrong_arity() {
    let raw = json!({ "name": "", "value": "x", "span": [1] });
    assert!(serde_json::from_value::<Group>(raw).is_err());
}

// ---------------------------------------------------------------------------
// MatchOutcome and ExecutionResult
// ---------------------------------------------------------------------------

#[test]
fn failure_never_carries_matches() {
    let outcome = MatchOutcome::from_parts(
        vec![Match::new("a", Span::new(0, 1), Vec::new())],
        "boom",
    );
    assert!(outcome.is_failure());
    assert!(outcome.matches().is_empty());
}

#[test]
fn execution_result_serialises_seconds_and_termination() {
    let result = ExecutionResult::new(
        MatchOutcome::failure("Timeout exceeded: 2.5 seconds"),
        Duration::from_millis(2500),
        Termination::TimedOut,
    );
    let value = serde_json::to_value(&result).expect("serialise");
    assert_eq!(
        value,
        json!({
            "matches": [],
            "error": "Timeout exceeded: 2.5 seconds",
            "elapsed_seconds": 2.5,
            "termination": "timed_out"
        })
    );
}

// ---------------------------------------------------------------------------
// TextIndex
// ---------------------------------------------------------------------------

#[rstest]
#[case::ascii("abc", 3)]
#[case::accented("naïve", 5)]
#[case::astral("😀😀", 2)]
#[case::empty("", 0)]
fn text_index_counts_characters(#[case] text: &str, #[case] expected: usize) {
    assert_eq!(TextIndex::new(text).char_len(), expected);
}

#[test]
fn text_index_rejects_split_surrogate() {
    let index = TextIndex::new("a😀b");
    assert_eq!(index.char_from_utf16(2), None);
    assert_eq!(index.char_from_utf16(3), Some(2));
    assert_eq!(index.span_from_utf16(1, 3), Some(Span::new(1, 2)));
}

#[test]
fn text_index_rejects_offsets_past_end() {
    let index = TextIndex::new("abc");
    assert_eq!(index.span_from_bytes(1, 4), None);
}

// ---------------------------------------------------------------------------
// Engine contract
// ---------------------------------------------------------------------------

#[rstest]
fn run_match_reports_matches(stub: StubEngine) {
    let outcome = run_match(&stub, "o", "Hello, World!", 0);
    let spans: Vec<Span> = outcome.matches().iter().map(Match::span).collect();
    assert_eq!(spans, [Span::new(4, 5), Span::new(8, 9)]);
    assert_eq!(outcome.error(), "");
}

#[rstest]
fn run_match_no_match_is_empty_success(stub: StubEngine) {
    let outcome = run_match(&stub, "xyz", "Hello, World!", 0);
    assert_eq!(outcome, MatchOutcome::success(Vec::new()));
}

#[rstest]
fn run_match_honours_flags(stub: StubEngine) {
    let plain = run_match(&stub, "hello", "Hello", 0);
    let folded = run_match(&stub, "hello", "Hello", flags::IGNORECASE);
    assert!(plain.matches().is_empty());
    assert_eq!(folded.matches().len(), 1);
}

#[rstest]
fn run_match_is_idempotent(stub: StubEngine) {
    let first = run_match(&stub, "l", "Hello, World!", 0);
    let second = run_match(&stub, "l", "Hello, World!", 0);
    assert_eq!(first, second);
}

#[test]
fn run_match_folds_engine_errors() {
    let engine = StubEngine::failing("broken", "missing ), unterminated subpattern");
    let outcome = run_match(&engine, "(", "text", 0);
    assert!(outcome.matches().is_empty());
    assert_eq!(outcome.error(), "missing ), unterminated subpattern");
}

#[rstest]
fn identity_pairs_name_and_version(stub: StubEngine) {
    let identity = stub.identity();
    assert_eq!(identity.name, "stub");
    assert_eq!(identity.version, StubEngine::VERSION);
}

#[rstest]
fn descriptor_defaults_to_no_reference_data(stub: StubEngine) {
    let descriptor = stub.descriptor();
    assert!(descriptor.cheat_sheet().is_empty());
    assert!(descriptor.example().is_none());
}

#[test]
fn registry_hands_out_engines_usable_with_run_match() {
    let mut registry = EngineRegistry::new();
    registry.register(StubEngine::new("stub")).expect("register");
    let engine = registry.get("stub").expect("lookup");
    let outcome = run_match(engine, "b", "abc", 0);
    assert_eq!(
        outcome.matches().first().map(Match::span),
        Some(Span::new(1, 2))
    );
}
