//! The capability contract every engine adapter satisfies.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::cheat_sheet::{CheatSheetSection, Example};
use crate::error::EngineError;
use crate::flags::{FlagBits, FlagSpec};
use crate::model::{Match, MatchOutcome};

/// Tracing target for engine invocations.
const ENGINE_TARGET: &str = "openregex_core::engine";

/// A regex implementation exposed through the uniform match contract.
///
/// Implementations hold only immutable state fixed at construction (name,
/// cached version, flag table, one-time setup results), so a single instance
/// can serve concurrent callers.
///
/// `raw_match` carries no timeout: it may be slow or never return. Deadlines
/// are enforced one level up by running the call in an isolated worker.
pub trait RegexEngine: Send + Sync {
    /// Stable display name, used as the registry key.
    fn name(&self) -> &str;

    /// Version string of the underlying implementation.
    ///
    /// Resolved at most once per instance and cached.
    fn version(&self) -> &str;

    /// Returns `(name, version)` together.
    fn identity(&self) -> EngineIdentity<'_> {
        EngineIdentity {
            name: self.name(),
            version: self.version(),
        }
    }

    /// Named option flags this engine understands.
    fn available_flags(&self) -> &[FlagSpec] {
        &[]
    }

    /// Syntax reference shown next to the engine.
    fn cheat_sheet(&self) -> &'static [CheatSheetSection] {
        &[]
    }

    /// Example pattern and text showcasing the engine.
    fn example(&self) -> Option<Example> {
        None
    }

    /// Runs the pattern against the text and returns every match.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the pattern is rejected, a construct is
    /// unsupported, or the underlying implementation fails.
    fn raw_match(&self, pattern: &str, text: &str, flags: FlagBits)
    -> Result<Vec<Match>, EngineError>;

    /// Renders an engine failure as the message shown to users.
    fn describe_error(&self, error: &EngineError) -> String {
        error.to_string()
    }

    /// Builds the immutable descriptor for this engine.
    fn descriptor(&self) -> EngineDescriptor {
        EngineDescriptor {
            name: self.name().to_owned(),
            version: self.version().to_owned(),
            available_flags: self
                .available_flags()
                .iter()
                .map(|spec| (spec.name().to_owned(), spec.bits()))
                .collect(),
            cheat_sheet: self.cheat_sheet(),
            example: self.example(),
        }
    }
}

/// Borrowed `(name, version)` pair of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineIdentity<'a> {
    /// Display name.
    pub name: &'a str,
    /// Version string.
    pub version: &'a str,
}

/// Everything a front end needs to present an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineDescriptor {
    name: String,
    version: String,
    available_flags: BTreeMap<String, FlagBits>,
    cheat_sheet: &'static [CheatSheetSection],
    example: Option<Example>,
}

impl EngineDescriptor {
    /// Engine display name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Engine version.
    #[must_use]
    pub const fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Flag name to bit value.
    #[must_use]
    pub const fn available_flags(&self) -> &BTreeMap<String, FlagBits> {
        &self.available_flags
    }

    /// Syntax reference sections.
    #[must_use]
    pub const fn cheat_sheet(&self) -> &'static [CheatSheetSection] {
        self.cheat_sheet
    }

    /// Showcase pattern and text, if the engine has one.
    #[must_use]
    pub const fn example(&self) -> Option<Example> {
        self.example
    }
}

/// Runs an engine and folds any failure into the returned outcome.
///
/// This is the only way callers should invoke [`RegexEngine::raw_match`]: it
/// never fails, and error text comes from the engine's own
/// [`RegexEngine::describe_error`].
pub fn run_match(
    engine: &dyn RegexEngine,
    pattern: &str,
    text: &str,
    flags: FlagBits,
) -> MatchOutcome {
    debug!(
        target: ENGINE_TARGET,
        engine = engine.name(),
        pattern,
        text_len = text.len(),
        flags,
        "matching pattern"
    );
    match engine.raw_match(pattern, text, flags) {
        Ok(matches) => {
            debug!(
                target: ENGINE_TARGET,
                engine = engine.name(),
                match_count = matches.len(),
                "pattern matched"
            );
            MatchOutcome::success(matches)
        }
        Err(error) => {
            let message = engine.describe_error(&error);
            debug!(
                target: ENGINE_TARGET,
                engine = engine.name(),
                error = %message,
                "engine reported an error"
            );
            MatchOutcome::failure(message)
        }
    }
}
