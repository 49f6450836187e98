//! Uniform match data produced by every engine.
//!
//! Offsets are character offsets (Unicode scalar values) into the text that
//! was matched, so a renderer can slice the original text without knowing
//! which engine produced the result.

use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` character-offset range into the matched text.
///
/// Serialised as a two-element array, matching the wire format the external
/// helpers emit.
///
/// # Example
///
/// ```
/// use openregex_core::Span;
///
/// let span = Span::new(7, 12);
/// assert_eq!(span.extract("Hello, World!"), Some("World"));
/// assert_eq!(span.len(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Creates a span from inclusive start and exclusive end offsets.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Inclusive start offset.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Exclusive end offset.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Number of characters covered by the span.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` when the span covers no characters.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Returns `true` when `0 <= start <= end <= char_len`.
    #[must_use]
    pub const fn fits(&self, char_len: usize) -> bool {
        self.start <= self.end && self.end <= char_len
    }

    /// Slices `text` by character offsets, returning `None` when the span
    /// does not fit the text.
    #[must_use]
    pub fn extract<'t>(&self, text: &'t str) -> Option<&'t str> {
        if self.start > self.end {
            return None;
        }
        let byte_at = |target: usize| {
            text.char_indices()
                .map(|(byte, _)| byte)
                .chain(std::iter::once(text.len()))
                .nth(target)
        };
        let start = byte_at(self.start)?;
        let end = byte_at(self.end)?;
        text.get(start..end)
    }
}

impl Serialize for Span {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.start, self.end].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Span {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [start, end] = <[usize; 2]>::deserialize(deserializer)?;
        Ok(Self::new(start, end))
    }
}

/// Serde adapter writing an absent span as `[]`.
mod optional_span {
    use super::{Deserialize, Deserializer, Serialize, Serializer, Span, de};

    #[expect(
        clippy::ref_option,
        reason = "serde `with` adapters receive a reference to the field"
    )]
    pub(super) fn serialize<S: Serializer>(
        span: &Option<Span>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match span {
            Some(present) => present.serialize(serializer),
            None => <[usize; 0]>::default().serialize(serializer),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Span>, D::Error> {
        let raw = Vec::<usize>::deserialize(deserializer)?;
        match raw.as_slice() {
            [] => Ok(None),
            [start, end] => Ok(Some(Span::new(*start, *end))),
            other => Err(de::Error::invalid_length(
                other.len(),
                &"an empty array or a [start, end] pair",
            )),
        }
    }
}

/// A named or positional capture inside one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    name: String,
    value: String,
    #[serde(with = "optional_span", default)]
    span: Option<Span>,
}

impl Group {
    /// Creates a group that participated in the match.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            span: Some(span),
        }
    }

    /// Creates a group that did not participate (or captured nothing).
    #[must_use]
    pub fn unmatched(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            span: None,
        }
    }

    /// Group name; empty for positional groups.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Captured text; empty when the group did not participate.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.value.as_str()
    }

    /// Character span of the capture, if any.
    #[must_use]
    pub const fn span(&self) -> Option<Span> {
        self.span
    }
}

/// One match of the pattern in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    text: String,
    span: Span,
    #[serde(default)]
    groups: Vec<Group>,
}

impl Match {
    /// Creates a match; `groups` must be in declaration order.
    #[must_use]
    pub fn new(text: impl Into<String>, span: Span, groups: Vec<Group>) -> Self {
        Self {
            text: text.into(),
            span,
            groups,
        }
    }

    /// The matched substring.
    #[must_use]
    pub const fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Character span of the whole match.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Capture groups in declaration order.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }
}

/// Result of one engine invocation: either matches or an error, never both.
///
/// # Example
///
/// ```
/// use openregex_core::{Match, MatchOutcome, Span};
///
/// let outcome = MatchOutcome::from_parts(
///     vec![Match::new("a", Span::new(0, 1), Vec::new())],
///     "unbalanced parenthesis",
/// );
/// assert!(outcome.matches().is_empty());
/// assert_eq!(outcome.error(), "unbalanced parenthesis");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchOutcome {
    matches: Vec<Match>,
    error: String,
}

impl MatchOutcome {
    /// Successful outcome carrying the matches (possibly none).
    #[must_use]
    pub const fn success(matches: Vec<Match>) -> Self {
        Self {
            matches,
            error: String::new(),
        }
    }

    /// Failed outcome carrying a human-readable error.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            matches: Vec::new(),
            error: error.into(),
        }
    }

    /// Rebuilds an outcome from raw parts, discarding matches when an error
    /// is present.
    #[must_use]
    pub fn from_parts(matches: Vec<Match>, error: impl Into<String>) -> Self {
        let message = error.into();
        if message.is_empty() {
            Self::success(matches)
        } else {
            Self::failure(message)
        }
    }

    /// Matches in leftmost-first order.
    #[must_use]
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Error message; empty on success.
    #[must_use]
    pub const fn error(&self) -> &str {
        self.error.as_str()
    }

    /// Returns `true` when the outcome carries an error.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        !self.error.is_empty()
    }

    /// Splits the outcome into matches and error.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Match>, String) {
        (self.matches, self.error)
    }
}

/// Terminal state of one coordinated execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The worker finished and reported a result.
    Completed,
    /// The deadline elapsed and the worker was cancelled.
    TimedOut,
    /// The worker could not start or vanished without a result.
    Crashed,
}

/// Outcome of a coordinated call plus its end-to-end wall-clock duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    matches: Vec<Match>,
    error: String,
    #[serde(rename = "elapsed_seconds", serialize_with = "seconds")]
    elapsed: Duration,
    termination: Termination,
}

fn seconds<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

impl ExecutionResult {
    /// Creates a result from an outcome, the measured duration, and the
    /// terminal state that produced it.
    #[must_use]
    pub fn new(outcome: MatchOutcome, elapsed: Duration, termination: Termination) -> Self {
        let (matches, error) = outcome.into_parts();
        Self {
            matches,
            error,
            elapsed,
            termination,
        }
    }

    /// Matches in leftmost-first order; empty on failure.
    #[must_use]
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Error message; empty on success.
    #[must_use]
    pub const fn error(&self) -> &str {
        self.error.as_str()
    }

    /// Wall-clock duration of the whole coordinated call.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Terminal state of the execution.
    #[must_use]
    pub const fn termination(&self) -> Termination {
        self.termination
    }
}
