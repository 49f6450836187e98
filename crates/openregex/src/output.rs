//! Rendering execution results for the terminal or for machines.

use std::io::{self, Write};

use openregex_core::{ExecutionResult, Group, Match, Span, Termination};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::errors::AppError;

/// Output format after resolving [`OutputFormat::Auto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolvedOutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    /// Human output on a terminal, JSON otherwise.
    pub(crate) const fn resolve(self, stdout_is_terminal: bool) -> ResolvedOutputFormat {
        match self {
            Self::Auto if stdout_is_terminal => ResolvedOutputFormat::Human,
            Self::Auto | Self::Json => ResolvedOutputFormat::Json,
            Self::Human => ResolvedOutputFormat::Human,
        }
    }
}

/// Writes `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T, W>(writer: &mut W, value: &T) -> Result<(), AppError>
where
    T: Serialize + ?Sized,
    W: Write,
{
    serde_json::to_writer_pretty(&mut *writer, value).map_err(AppError::Serialise)?;
    writeln!(writer).map_err(AppError::WriteOutput)
}

/// Writes one execution result in `format`.
pub(crate) fn write_result<W: Write>(
    writer: &mut W,
    engine: &str,
    result: &ExecutionResult,
    format: ResolvedOutputFormat,
) -> Result<(), AppError> {
    match format {
        ResolvedOutputFormat::Json => write_json(writer, result),
        ResolvedOutputFormat::Human => writer
            .write_all(render_human(engine, result).as_bytes())
            .map_err(AppError::WriteOutput),
    }
}

/// Renders a result as indented text, one match per block.
#[must_use]
pub fn render_human(engine: &str, result: &ExecutionResult) -> String {
    let mut out = String::new();
    for (index, found) in result.matches().iter().enumerate() {
        push_match(&mut out, index + 1, found);
    }
    if !result.error().is_empty() {
        out.push_str(&format!("error: {}\n", result.error()));
    }
    let summary = match result.termination() {
        Termination::Completed => "completed",
        Termination::TimedOut => "timed out",
        Termination::Crashed => "crashed",
    };
    out.push_str(&format!(
        "{engine}: {} match(es), {summary} in {:.3}s\n",
        result.matches().len(),
        result.elapsed().as_secs_f64()
    ));
    out
}

fn push_match(out: &mut String, number: usize, found: &Match) {
    out.push_str(&format!(
        "match {number} {}: {:?}\n",
        span_text(found.span()),
        found.text()
    ));
    for (index, group) in found.groups().iter().enumerate() {
        push_group(out, index + 1, group);
    }
}

fn push_group(out: &mut String, number: usize, group: &Group) {
    let label = if group.name().is_empty() {
        format!("group {number}")
    } else {
        format!("group {number} <{}>", group.name())
    };
    let line = match group.span() {
        Some(span) => format!("  {label} {}: {:?}\n", span_text(span), group.value()),
        None => format!("  {label}: unmatched\n"),
    };
    out.push_str(&line);
}

fn span_text(span: Span) -> String {
    format!("[{}, {})", span.start(), span.end())
}

/// Writes `lines` one per line.
pub(crate) fn write_lines<W, I>(writer: &mut W, lines: I) -> Result<(), AppError>
where
    W: Write,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    lines
        .into_iter()
        .try_for_each(|line| writeln!(writer, "{}", line.as_ref()))
        .map_err(AppError::WriteOutput)
}

/// Flushes `writer`, treating a closed pipe as success.
pub(crate) fn finish<W: Write>(writer: &mut W) -> Result<(), AppError> {
    match writer.flush() {
        Err(error) if error.kind() != io::ErrorKind::BrokenPipe => {
            Err(AppError::WriteOutput(error))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use openregex_core::MatchOutcome;
    use rstest::rstest;

    use super::*;

    fn sample() -> ExecutionResult {
        let found = Match::new(
            "Hello",
            Span::new(0, 5),
            vec![
                Group::new("word", "Hello", Span::new(0, 5)),
                Group::unmatched(""),
            ],
        );
        ExecutionResult::new(
            MatchOutcome::success(vec![found]),
            Duration::from_millis(12),
            Termination::Completed,
        )
    }

    #[test]
    fn human_output_lists_matches_and_groups() {
        let text = render_human("Rust - regex", &sample());
        assert_eq!(
            text,
            "match 1 [0, 5): \"Hello\"\n  group 1 <word> [0, 5): \"Hello\"\n  group 2: unmatched\nRust - regex: 1 match(es), completed in 0.012s\n"
        );
    }

    #[test]
    fn human_output_reports_errors() {
        let result = ExecutionResult::new(
            MatchOutcome::failure("Timeout exceeded: 5 seconds"),
            Duration::from_secs(5),
            Termination::TimedOut,
        );
        let text = render_human("Java", &result);
        assert!(text.contains("error: Timeout exceeded: 5 seconds\n"));
        assert!(text.ends_with("Java: 0 match(es), timed out in 5.000s\n"));
    }

    #[test]
    fn json_output_uses_the_wire_names() {
        let mut buffer = Vec::new();
        write_result(&mut buffer, "Rust - regex", &sample(), ResolvedOutputFormat::Json)
            .expect("render");
        let json: serde_json::Value = serde_json::from_slice(&buffer).expect("json");
        assert_eq!(json["matches"][0]["text"], "Hello");
        assert_eq!(json["matches"][0]["groups"][1]["span"], serde_json::json!([]));
        assert_eq!(json["termination"], "completed");
        assert_eq!(json["error"], "");
    }

    #[rstest]
    #[case(OutputFormat::Auto, true, ResolvedOutputFormat::Human)]
    #[case(OutputFormat::Auto, false, ResolvedOutputFormat::Json)]
    #[case(OutputFormat::Json, true, ResolvedOutputFormat::Json)]
    #[case(OutputFormat::Human, false, ResolvedOutputFormat::Human)]
    fn output_format_resolution(
        #[case] format: OutputFormat,
        #[case] terminal: bool,
        #[case] expected: ResolvedOutputFormat,
    ) {
        assert_eq!(format.resolve(terminal), expected);
    }
}
