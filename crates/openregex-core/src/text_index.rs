//! Offset conversion between encodings of the same text.
//!
//! Engines report offsets in their native unit: UTF-8 bytes for Rust and the
//! C++ shim, UTF-16 code units for Java and JavaScript. [`TextIndex`] maps
//! those back to character offsets so every span shares one unit.

use crate::model::Span;

/// Precomputed character boundaries of one text.
///
/// # Example
///
/// ```
/// use openregex_core::{Span, TextIndex};
///
/// let index = TextIndex::new("naïve 😀!");
/// assert_eq!(index.char_len(), 8);
/// assert_eq!(index.char_from_byte(3), None);
/// assert_eq!(index.span_from_bytes(0, 6), Some(Span::new(0, 5)));
/// assert_eq!(index.span_from_utf16(6, 8), Some(Span::new(6, 7)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextIndex {
    byte_starts: Vec<usize>,
    utf16_starts: Vec<usize>,
}

impl TextIndex {
    /// Indexes `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut byte_starts = Vec::with_capacity(text.len() + 1);
        let mut utf16_starts = Vec::with_capacity(text.len() + 1);
        let mut utf16 = 0;
        for (byte, ch) in text.char_indices() {
            byte_starts.push(byte);
            utf16_starts.push(utf16);
            utf16 += ch.len_utf16();
        }
        byte_starts.push(text.len());
        utf16_starts.push(utf16);
        Self {
            byte_starts,
            utf16_starts,
        }
    }

    /// Number of characters in the text.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.byte_starts.len().saturating_sub(1)
    }

    /// Character offset of a UTF-8 byte offset, or `None` when the offset is
    /// not on a character boundary.
    #[must_use]
    pub fn char_from_byte(&self, byte: usize) -> Option<usize> {
        self.byte_starts.binary_search(&byte).ok()
    }

    /// Character offset of a UTF-16 code-unit offset, or `None` when the
    /// offset splits a surrogate pair or lies past the end.
    #[must_use]
    pub fn char_from_utf16(&self, unit: usize) -> Option<usize> {
        self.utf16_starts.binary_search(&unit).ok()
    }

    /// Converts a UTF-8 byte range to a character span.
    #[must_use]
    pub fn span_from_bytes(&self, start: usize, end: usize) -> Option<Span> {
        let span = Span::new(self.char_from_byte(start)?, self.char_from_byte(end)?);
        span.fits(self.char_len()).then_some(span)
    }

    /// Converts a UTF-16 code-unit range to a character span.
    #[must_use]
    pub fn span_from_utf16(&self, start: usize, end: usize) -> Option<Span> {
        let span = Span::new(self.char_from_utf16(start)?, self.char_from_utf16(end)?);
        span.fits(self.char_len()).then_some(span)
    }
}
