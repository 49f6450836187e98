//! Shared model and engine contract for OpenRegex.
//!
//! `openregex-core` defines the uniform shape every regex engine reports
//! ([`Match`], [`Group`], [`MatchOutcome`]), the capability trait all engine
//! adapters implement ([`RegexEngine`]), and the start-up registry that maps
//! display names to engine instances ([`EngineRegistry`]).
//!
//! Engines are black boxes behind one call contract. The adapters live in
//! `openregex-engines`; the deadline-enforcing coordinator lives in the
//! `openregex` crate.
//!
//! # Example
//!
//! ```
//! use openregex_core::{EngineError, EngineRegistry, Match, RegexEngine, Span, run_match};
//!
//! struct Literal;
//!
//! impl RegexEngine for Literal {
//!     fn name(&self) -> &str { "literal" }
//!     fn version(&self) -> &str { "1.0" }
//!     fn raw_match(&self, pattern: &str, text: &str, _flags: u32)
//!         -> Result<Vec<Match>, EngineError>
//!     {
//!         Ok(text
//!             .match_indices(pattern)
//!             .map(|(at, hit)| Match::new(hit, Span::new(at, at + hit.len()), Vec::new()))
//!             .collect())
//!     }
//! }
//!
//! let mut registry = EngineRegistry::new();
//! registry.register(Literal).expect("first registration succeeds");
//! let engine = registry.get("literal").expect("registered");
//! let outcome = run_match(engine, "lo", "hello", 0);
//! assert_eq!(outcome.matches().len(), 1);
//! assert!(outcome.error().is_empty());
//! ```

mod cheat_sheet;
mod engine;
pub mod error;
pub mod flags;
mod model;
pub mod registry;
mod text_index;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

#[cfg(test)]
mod tests;

pub use self::cheat_sheet::{CheatSheetEntry, CheatSheetSection, Example};
pub use self::engine::{EngineDescriptor, EngineIdentity, RegexEngine, run_match};
pub use self::error::{EngineError, RegistryError};
pub use self::flags::{FlagBits, FlagSpec, UnknownFlagError};
pub use self::model::{ExecutionResult, Group, Match, MatchOutcome, Span, Termination};
pub use self::registry::EngineRegistry;
pub use self::text_index::TextIndex;
