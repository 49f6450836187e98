//! Building uniform matches from byte-offset captures.

use openregex_core::{EngineError, Group, Match, Span, TextIndex};

/// One capture as reported by an in-process engine, in UTF-8 byte offsets.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ByteCapture<'t> {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) text: &'t str,
}

/// Converts a byte range into a character span.
pub(crate) fn char_span(index: &TextIndex, start: usize, end: usize) -> Result<Span, EngineError> {
    index.span_from_bytes(start, end).ok_or_else(|| {
        EngineError::protocol(format!(
            "byte range {start}..{end} does not fall on character boundaries"
        ))
    })
}

/// Builds a [`Match`] from the whole-match capture and its groups.
///
/// `names` is the capture-name table, position 0 being the whole match.
/// Groups that did not participate or captured nothing get an empty value
/// and no span.
pub(crate) fn build_match<'t, G>(
    index: &TextIndex,
    whole: ByteCapture<'t>,
    groups: G,
    names: &[Option<String>],
) -> Result<Match, EngineError>
where
    G: IntoIterator<Item = Option<ByteCapture<'t>>>,
{
    let span = char_span(index, whole.start, whole.end)?;
    let converted = groups
        .into_iter()
        .enumerate()
        .map(|(offset, capture)| {
            let name = names
                .get(offset + 1)
                .and_then(Clone::clone)
                .unwrap_or_default();
            match capture {
                Some(group) if !group.text.is_empty() => {
                    let group_span = char_span(index, group.start, group.end)?;
                    Ok(Group::new(name, group.text, group_span))
                }
                _ => Ok(Group::unmatched(name)),
            }
        })
        .collect::<Result<Vec<_>, EngineError>>()?;
    Ok(Match::new(whole.text, span, converted))
}
