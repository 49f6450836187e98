//! Option flags shared by the engine adapters.
//!
//! Flags travel as a single integer whose bits are combined with bitwise OR.
//! The uniform values below are what callers pass; engines advertise the
//! subset they understand through [`RegexEngine::available_flags`] and
//! translate the bits into their own representation.
//!
//! [`RegexEngine::available_flags`]: crate::RegexEngine::available_flags

use serde::Serialize;
use thiserror::Error;

/// Integer carrying OR-combined flag bits.
pub type FlagBits = u32;

/// Case-insensitive matching.
pub const IGNORECASE: FlagBits = 2;
/// `^` and `$` match at line boundaries.
pub const MULTILINE: FlagBits = 8;
/// `.` also matches a newline.
pub const DOTALL: FlagBits = 16;
/// Unicode-aware classes and case folding.
pub const UNICODE: FlagBits = 32;
/// Whitespace and `#` comments in the pattern are ignored.
pub const VERBOSE: FlagBits = 64;

/// A named flag and the bits it sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagSpec {
    name: &'static str,
    bits: FlagBits,
}

impl FlagSpec {
    /// Declares a flag.
    #[must_use]
    pub const fn new(name: &'static str, bits: FlagBits) -> Self {
        Self { name, bits }
    }

    /// Flag name as shown to users.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Bits set by the flag.
    #[must_use]
    pub const fn bits(&self) -> FlagBits {
        self.bits
    }

    /// Returns `true` when every bit of this flag is set in `flags`.
    #[must_use]
    pub const fn is_set_in(&self, flags: FlagBits) -> bool {
        self.bits != 0 && flags & self.bits == self.bits
    }
}

/// A flag name that the selected engine does not advertise.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown flag '{name}' (available: {available})")]
pub struct UnknownFlagError {
    /// The rejected flag name.
    pub name: String,
    /// Comma-separated list of flags the engine supports.
    pub available: String,
}

/// Combines flag names into bits using an engine's flag table.
///
/// Names are matched case-insensitively.
///
/// # Errors
///
/// Returns [`UnknownFlagError`] for the first name missing from `table`.
///
/// # Example
///
/// ```
/// use openregex_core::flags::{self, FlagSpec, resolve_names};
///
/// let table = [
///     FlagSpec::new("IGNORECASE", flags::IGNORECASE),
///     FlagSpec::new("MULTILINE", flags::MULTILINE),
/// ];
/// let bits = resolve_names(&table, ["ignorecase", "MULTILINE"]).expect("known flags");
/// assert_eq!(bits, flags::IGNORECASE | flags::MULTILINE);
/// assert!(resolve_names(&table, ["DOTALL"]).is_err());
/// ```
pub fn resolve_names<I, S>(table: &[FlagSpec], names: I) -> Result<FlagBits, UnknownFlagError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names.into_iter().try_fold(0, |bits, requested| {
        let wanted = requested.as_ref();
        table
            .iter()
            .find(|spec| spec.name().eq_ignore_ascii_case(wanted))
            .map(|spec| bits | spec.bits())
            .ok_or_else(|| UnknownFlagError {
                name: wanted.to_owned(),
                available: table
                    .iter()
                    .map(FlagSpec::name)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    })
}
