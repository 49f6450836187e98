//! Test doubles for code that consumes [`RegexEngine`].
//!
//! Enabled for this crate's own tests and, through the `test-support`
//! feature, for dependent crates.

use crate::engine::RegexEngine;
use crate::error::EngineError;
use crate::flags::{self, FlagBits, FlagSpec};
use crate::model::Match;
use crate::text_index::TextIndex;

const STUB_FLAGS: &[FlagSpec] = &[FlagSpec::new("IGNORECASE", flags::IGNORECASE)];

#[derive(Debug, Clone)]
enum Behaviour {
    Literal,
    Fail(String),
    Panic(String),
}

/// Engine that treats the pattern as a literal string.
///
/// Supports `IGNORECASE` for ASCII text. Can be switched to always fail or
/// always panic to exercise error paths.
#[derive(Debug, Clone)]
pub struct StubEngine {
    name: String,
    behaviour: Behaviour,
}

impl StubEngine {
    /// Version reported by every stub.
    pub const VERSION: &'static str = "stub - 1.0";

    /// Creates a literal-matching stub.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviour: Behaviour::Literal,
        }
    }

    /// Creates a stub whose every match fails with a pattern error.
    #[must_use]
    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviour: Behaviour::Fail(message.into()),
        }
    }

    /// Creates a stub whose every match panics.
    #[must_use]
    pub fn panicking(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviour: Behaviour::Panic(message.into()),
        }
    }
}

impl RegexEngine for StubEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        Self::VERSION
    }

    fn available_flags(&self) -> &[FlagSpec] {
        STUB_FLAGS
    }

    fn raw_match(
        &self,
        pattern: &str,
        text: &str,
        flags: FlagBits,
    ) -> Result<Vec<Match>, EngineError> {
        match &self.behaviour {
            Behaviour::Fail(message) => Err(EngineError::pattern(message.clone())),
            Behaviour::Panic(message) => panic!("{message}"),
            Behaviour::Literal => Ok(literal_matches(pattern, text, flags)),
        }
    }
}

fn literal_matches(pattern: &str, text: &str, flags: FlagBits) -> Vec<Match> {
    if pattern.is_empty() {
        return Vec::new();
    }
    let folded = flags & flags::IGNORECASE != 0;
    let (haystack, needle) = if folded {
        (text.to_ascii_lowercase(), pattern.to_ascii_lowercase())
    } else {
        (text.to_owned(), pattern.to_owned())
    };
    let index = TextIndex::new(text);
    haystack
        .match_indices(needle.as_str())
        .filter_map(|(at, _)| {
            let end = at + needle.len();
            let span = index.span_from_bytes(at, end)?;
            let matched = text.get(at..end)?;
            Some(Match::new(matched, span, Vec::new()))
        })
        .collect()
}
