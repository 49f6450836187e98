//! In-process engines backed by the `regex` and `fancy-regex` crates.
//!
//! `regex` guarantees linear-time matching and rejects backreferences and
//! lookaround. `fancy-regex` adds both through a backtracking VM; it runs with
//! no backtrack limit, so a catastrophic pattern really does hang and only the
//! coordinator's deadline stops it.

use openregex_core::flags::{self, FlagBits, FlagSpec};
use openregex_core::{CheatSheetSection, EngineError, Example, Match, RegexEngine, TextIndex};

use crate::capture::{ByteCapture, build_match};
use crate::reference;

/// Version reported for the `regex` engine.
const REGEX_VERSION: &str = "regex - 1.11";
/// Version reported for the `fancy-regex` engine.
const FANCY_REGEX_VERSION: &str = "fancy-regex - 0.14";

pub(crate) const RUST_FLAGS: &[FlagSpec] = &[
    FlagSpec::new("IGNORECASE", flags::IGNORECASE),
    FlagSpec::new("MULTILINE", flags::MULTILINE),
    FlagSpec::new("DOTALL", flags::DOTALL),
    FlagSpec::new("VERBOSE", flags::VERBOSE),
];

/// The linear-time `regex` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustRegexEngine;

impl RustRegexEngine {
    /// Display name of this engine.
    pub const NAME: &'static str = "Rust - regex";

    /// Creates the engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl RegexEngine for RustRegexEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &str {
        REGEX_VERSION
    }

    fn available_flags(&self) -> &[FlagSpec] {
        RUST_FLAGS
    }

    fn cheat_sheet(&self) -> &'static [CheatSheetSection] {
        reference::RUST_REGEX.sheet
    }

    fn example(&self) -> Option<Example> {
        Some(reference::RUST_REGEX.example)
    }

    fn raw_match(
        &self,
        pattern: &str,
        text: &str,
        flags: FlagBits,
    ) -> Result<Vec<Match>, EngineError> {
        let compiled = regex::RegexBuilder::new(pattern)
            .case_insensitive(flags & flags::IGNORECASE != 0)
            .multi_line(flags & flags::MULTILINE != 0)
            .dot_matches_new_line(flags & flags::DOTALL != 0)
            .ignore_whitespace(flags & flags::VERBOSE != 0)
            .build()
            .map_err(|err| EngineError::pattern(err.to_string()))?;
        let names: Vec<Option<String>> = compiled
            .capture_names()
            .map(|name| name.map(str::to_owned))
            .collect();
        let index = TextIndex::new(text);
        compiled
            .captures_iter(text)
            .map(|caps| {
                let whole = caps
                    .get(0)
                    .map(to_capture)
                    .ok_or_else(|| EngineError::protocol("capture set without a whole match"))?;
                let groups = (1..caps.len()).map(|i| caps.get(i).map(to_capture));
                build_match(&index, whole, groups, &names)
            })
            .collect()
    }
}

fn to_capture(found: regex::Match<'_>) -> ByteCapture<'_> {
    ByteCapture {
        start: found.start(),
        end: found.end(),
        text: found.as_str(),
    }
}

/// The backtracking `fancy-regex` crate with an unbounded backtrack limit.
#[derive(Debug, Default, Clone, Copy)]
pub struct FancyRegexEngine;

impl FancyRegexEngine {
    /// Display name of this engine.
    pub const NAME: &'static str = "Rust - fancy-regex";

    /// Creates the engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Inline flag group equivalent to `flags`, such as `(?im)`.
fn inline_flags(flags: FlagBits) -> String {
    let letters: String = [
        (flags::IGNORECASE, 'i'),
        (flags::MULTILINE, 'm'),
        (flags::DOTALL, 's'),
        (flags::VERBOSE, 'x'),
    ]
    .into_iter()
    .filter(|(bit, _)| flags & bit != 0)
    .map(|(_, letter)| letter)
    .collect();
    if letters.is_empty() {
        letters
    } else {
        format!("(?{letters})")
    }
}

impl RegexEngine for FancyRegexEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &str {
        FANCY_REGEX_VERSION
    }

    fn available_flags(&self) -> &[FlagSpec] {
        RUST_FLAGS
    }

    fn cheat_sheet(&self) -> &'static [CheatSheetSection] {
        reference::FANCY_REGEX.sheet
    }

    fn example(&self) -> Option<Example> {
        Some(reference::FANCY_REGEX.example)
    }

    fn raw_match(
        &self,
        pattern: &str,
        text: &str,
        flags: FlagBits,
    ) -> Result<Vec<Match>, EngineError> {
        let source = format!("{}{pattern}", inline_flags(flags));
        let compiled = fancy_regex::RegexBuilder::new(&source)
            .backtrack_limit(usize::MAX)
            .build()
            .map_err(|err| EngineError::pattern(err.to_string()))?;
        let names: Vec<Option<String>> = compiled
            .capture_names()
            .map(|name| name.map(str::to_owned))
            .collect();
        let index = TextIndex::new(text);
        compiled
            .captures_iter(text)
            .map(|found| {
                let caps = found.map_err(|err| EngineError::Runtime {
                    message: err.to_string(),
                })?;
                let whole = caps
                    .get(0)
                    .map(to_fancy_capture)
                    .ok_or_else(|| EngineError::protocol("capture set without a whole match"))?;
                let groups = (1..caps.len()).map(|i| caps.get(i).map(to_fancy_capture));
                build_match(&index, whole, groups, &names)
            })
            .collect()
    }
}

fn to_fancy_capture(found: fancy_regex::Match<'_>) -> ByteCapture<'_> {
    ByteCapture {
        start: found.start(),
        end: found.end(),
        text: found.as_str(),
    }
}
