//! Tests for the JavaScript engine.
//!
//! Tests that run the helper return early when `node` is absent.

use openregex_core::{Group, Span, run_match};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

struct Prepared {
    _assets: TempDir,
    engine: NodeEngine,
}

#[fixture]
fn prepared() -> Option<Prepared> {
    let assets = TempDir::new().expect("temp dir");
    let engine = NodeEngine::new(&EngineSettings::new(assets.path()));
    engine.script.is_ok().then_some(Prepared {
        _assets: assets,
        engine,
    })
}

#[rstest]
#[case::none(0, "")]
#[case::ignore_case(flags::IGNORECASE, "i")]
#[case::all(
    flags::IGNORECASE | flags::MULTILINE | flags::DOTALL | flags::UNICODE,
    "imsu"
)]
#[case::unknown_bits_dropped(flags::VERBOSE | flags::MULTILINE, "m")]
fn translates_flag_bits(#[case] bits: FlagBits, #[case] expected: &str) {
    assert_eq!(flag_string(bits), expected);
}

#[test]
fn missing_runtime_makes_engine_unavailable() {
    let assets = TempDir::new().expect("temp dir");
    let settings = EngineSettings::new(assets.path()).with_node_binary("openregex-missing-node");
    let engine = NodeEngine::new(&settings);
    assert_eq!(engine.version(), "Node.js version unknown");
    let err = engine
        .raw_match("a", "a", 0)
        .expect_err("setup failure should surface");
    assert!(matches!(err, EngineError::Unavailable { .. }));
}

#[test]
fn pattern_errors_carry_the_runtime_prefix() {
    let assets = TempDir::new().expect("temp dir");
    let settings = EngineSettings::new(assets.path()).with_node_binary("openregex-missing-node");
    let engine = NodeEngine::new(&settings);
    let message = engine.describe_error(&EngineError::pattern("Unterminated group"));
    assert_eq!(message, "Node.js Regex Error: Unterminated group");
}

#[rstest]
fn finds_words_with_named_groups(prepared: Option<Prepared>) {
    let Some(fixture) = prepared else { return };
    let outcome = run_match(&fixture.engine, r"(?<name>\w+)\W", "Hello, World!", 0);
    assert_eq!(outcome.error(), "");
    let found: Vec<_> = outcome.matches().iter().map(Match::text).collect();
    assert_eq!(found, ["Hello,", "World!"]);
    let first = outcome.matches().first().expect("match");
    assert_eq!(first.groups(), [Group::new("name", "Hello", Span::new(0, 5))]);
    assert!(fixture.engine.version().starts_with("Node.js - "));
}

#[rstest]
fn offsets_are_characters(prepared: Option<Prepared>) {
    let Some(fixture) = prepared else { return };
    let outcome = run_match(&fixture.engine, "b", "a😀b", 0);
    let first = outcome.matches().first().expect("match");
    assert_eq!(first.span(), Span::new(2, 3));
}

#[rstest]
fn empty_matches_step_over_surrogate_pairs(prepared: Option<Prepared>) {
    let Some(fixture) = prepared else { return };
    let outcome = run_match(&fixture.engine, "", "😀", 0);
    assert_eq!(outcome.error(), "");
    let spans: Vec<_> = outcome.matches().iter().map(Match::span).collect();
    assert_eq!(spans, [Span::new(0, 0), Span::new(1, 1)]);
}

#[rstest]
fn optional_group_is_unmatched(prepared: Option<Prepared>) {
    let Some(fixture) = prepared else { return };
    let outcome = run_match(&fixture.engine, "a(b)?", "a", 0);
    let first = outcome.matches().first().expect("match");
    assert_eq!(first.groups(), [Group::unmatched("")]);
}

#[rstest]
fn syntax_errors_are_reported(prepared: Option<Prepared>) {
    let Some(fixture) = prepared else { return };
    let outcome = run_match(&fixture.engine, "(unclosed", "text", 0);
    assert!(outcome.matches().is_empty());
    assert!(
        outcome.error().starts_with("Node.js Regex Error: "),
        "{}",
        outcome.error()
    );
}

#[rstest]
fn ignore_case_flag_applies(prepared: Option<Prepared>) {
    let Some(fixture) = prepared else { return };
    let outcome = run_match(&fixture.engine, "hello", "HELLO", flags::IGNORECASE);
    assert_eq!(outcome.matches().len(), 1);
}

/// Writes a stand-in for `node` that logs its arguments to `log`.
#[cfg(unix)]
fn logging_node(dir: &std::path::Path, log: &std::path::Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let program = dir.join("fake-node");
    let script = format!(
        "#!/bin/sh\n\
         echo \"$*\" >> '{}'\n\
         if [ \"$1\" = \"--version\" ]; then echo v20.1.0; exit 0; fi\n\
         echo '{{\"matches\": [{{\"match\": \"a\", \"index\": [0, 1], \"groups\": []}}]}}'\n",
        log.display()
    );
    std::fs::write(&program, script).expect("write fake node");
    std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755))
        .expect("make fake node executable");
    program
}

#[cfg(unix)]
#[test]
fn adopted_state_never_queries_the_runtime_again() {
    let assets = TempDir::new().expect("temp dir");
    let log = assets.path().join("node.log");
    let node = logging_node(assets.path(), &log);
    let settings = EngineSettings::new(assets.path()).with_node_binary(node.display().to_string());

    let state = NodeEngine::prepare(&settings);
    for _ in 0..2 {
        let engine = NodeEngine::from_prepared(state.clone());
        assert_eq!(engine.version(), "Node.js - 20.1.0");
        let found = engine.raw_match("a", "a", 0).expect("match");
        assert_eq!(found.len(), 1);
    }

    let calls = std::fs::read_to_string(&log).expect("read log");
    let version_queries = calls.lines().filter(|line| *line == "--version").count();
    assert_eq!(version_queries, 1, "calls: {calls}");
    assert_eq!(calls.lines().count(), 3, "calls: {calls}");
}
