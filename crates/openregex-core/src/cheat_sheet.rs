//! Static reference data attached to each engine.

use serde::Serialize;

/// One row of an engine's syntax cheat sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheatSheetEntry {
    token: &'static str,
    description: &'static str,
}

impl CheatSheetEntry {
    /// Declares a syntax token and what it does.
    #[must_use]
    pub const fn new(token: &'static str, description: &'static str) -> Self {
        Self { token, description }
    }

    /// The syntax token, for example `\d`.
    #[must_use]
    pub const fn token(&self) -> &'static str {
        self.token
    }

    /// What the token matches.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }
}

/// A titled group of cheat sheet entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheatSheetSection {
    category: &'static str,
    entries: &'static [CheatSheetEntry],
}

impl CheatSheetSection {
    /// Declares a section.
    #[must_use]
    pub const fn new(category: &'static str, entries: &'static [CheatSheetEntry]) -> Self {
        Self { category, entries }
    }

    /// Section title.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        self.category
    }

    /// Entries in display order.
    #[must_use]
    pub const fn entries(&self) -> &'static [CheatSheetEntry] {
        self.entries
    }
}

/// A ready-made pattern and text that showcase an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Example {
    pattern: &'static str,
    text: &'static str,
}

impl Example {
    /// Declares an example.
    #[must_use]
    pub const fn new(pattern: &'static str, text: &'static str) -> Self {
        Self { pattern, text }
    }

    /// Example pattern.
    #[must_use]
    pub const fn pattern(&self) -> &'static str {
        self.pattern
    }

    /// Example text.
    #[must_use]
    pub const fn text(&self) -> &'static str {
        self.text
    }
}
