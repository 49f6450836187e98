//! Output format shared by the external helper programs.
//!
//! Java and Node.js helpers print one JSON object:
//! `{"matches": [{"match", "index": [start, end], "groups": [...]}], "error"}`
//! with offsets in UTF-16 code units. Groups carry `name`, `value` and an
//! `index` that is empty when the group did not participate.

use openregex_core::{EngineError, Group, Match, Span, TextIndex};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct HelperOutput {
    #[serde(default)]
    matches: Vec<HelperMatch>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HelperMatch {
    #[serde(rename = "match")]
    text: String,
    index: Vec<usize>,
    #[serde(default)]
    groups: Vec<HelperGroup>,
}

#[derive(Debug, Deserialize)]
struct HelperGroup {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    index: Vec<usize>,
}

/// Decoded helper output: matches in character offsets and an optional
/// error reported by the helper itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HelperReport {
    pub(crate) matches: Vec<Match>,
    pub(crate) error: Option<String>,
}

/// Parses helper stdout produced for `text`.
pub(crate) fn parse_report(stdout: &str, text: &str) -> Result<HelperReport, EngineError> {
    let output: HelperOutput = serde_json::from_str(stdout.trim())
        .map_err(|err| EngineError::protocol(format!("helper printed invalid JSON: {err}")))?;
    let index = TextIndex::new(text);
    let matches = output
        .matches
        .into_iter()
        .map(|found| convert_match(&index, found))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(HelperReport {
        matches,
        error: output.error.filter(|message| !message.is_empty()),
    })
}

fn utf16_span(index: &TextIndex, range: &[usize]) -> Result<Option<Span>, EngineError> {
    match *range {
        [] => Ok(None),
        [start, end] => index.span_from_utf16(start, end).map(Some).ok_or_else(|| {
            EngineError::protocol(format!(
                "offsets {start}..{end} do not fall on character boundaries"
            ))
        }),
        _ => Err(EngineError::protocol(format!(
            "expected an empty index or a [start, end] pair, got {range:?}"
        ))),
    }
}

fn convert_match(index: &TextIndex, found: HelperMatch) -> Result<Match, EngineError> {
    let span = utf16_span(index, &found.index)?
        .ok_or_else(|| EngineError::protocol("match without an index"))?;
    let groups = found
        .groups
        .into_iter()
        .map(|group| {
            let value = group.value.unwrap_or_default();
            match utf16_span(index, &group.index)? {
                Some(group_span) if !value.is_empty() => {
                    Ok(Group::new(group.name, value, group_span))
                }
                _ => Ok(Group::unmatched(group.name)),
            }
        })
        .collect::<Result<Vec<_>, EngineError>>()?;
    Ok(Match::new(found.text, span, groups))
}
