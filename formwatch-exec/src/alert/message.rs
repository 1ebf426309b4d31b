use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::classify::Deviation;
use crate::executor::JourneyResult;

/// Chat webhooks reject longer bodies.
pub const MAX_MESSAGE_CHARS: usize = 1900;

pub struct MessageParts<'a> {
    pub run_id: Uuid,
    pub journey_id: &'a str,
    pub url: &'a str,
    pub started_at: DateTime<Utc>,
    pub attempts: usize,
    pub screenshot: Option<&'a Path>,
}

/// Budget for each of `expected` and `observed`; inner HTML can run to kilobytes.
pub const MAX_VALUE_CHARS: usize = 600;

const ELIDED: &str = " …[truncated]";

/// Operator-facing alert body. Everything needed to triage is inline.
///
/// Identifying fields come first. `expected` and `observed` are clipped to their own budget so a
/// long value never pushes the url, run or timestamp out of the message.
pub fn render_alert(parts: &MessageParts<'_>, deviation: &Deviation, last: &JourneyResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "**formwatch alert** journey `{}` deviated at step `{}`",
        parts.journey_id, deviation.step_id
    );
    let _ = writeln!(out, "kind: {} ({})", deviation.kind, deviation.severity);
    let _ = writeln!(out, "url: {}", parts.url);
    let _ = writeln!(
        out,
        "run: {} at {}",
        parts.run_id,
        parts.started_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let _ = writeln!(out, "attempts: {}", parts.attempts);
    if let Some(path) = parts.screenshot {
        let _ = writeln!(out, "screenshot: {}", path.display());
    }
    let _ = writeln!(out, "expected: {}", elide(&deviation.expected, MAX_VALUE_CHARS));
    let _ = writeln!(out, "observed: {}", elide(&deviation.observed, MAX_VALUE_CHARS));
    for (step_id, value) in &last.generated_values {
        let _ = writeln!(out, "input {step_id}: {value}");
    }
    truncate_chars(out.trim_end(), MAX_MESSAGE_CHARS)
}

/// Clips `value` to `max` characters, marking the cut.
fn elide(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let keep = max.saturating_sub(ELIDED.chars().count());
    let mut clipped = truncate_chars(value, keep);
    clipped.push_str(ELIDED);
    clipped
}

pub fn render_pass_notice(parts: &MessageParts<'_>, last: &JourneyResult) -> String {
    let mut out = format!(
        "formwatch: journey `{}` passed ({} steps, attempt {}) run {} at {}",
        parts.journey_id,
        last.steps.len(),
        parts.attempts,
        parts.run_id,
        parts.started_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    for (step_id, value) in &last.generated_values {
        let _ = write!(out, "\ninput {step_id}: {value}");
    }
    truncate_chars(&out, MAX_MESSAGE_CHARS)
}

/// Cuts `s` to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn elide_marks_the_cut_and_keeps_the_budget() {
        assert_eq!(elide("short", 10), "short");
        let long = "x".repeat(50);
        let clipped = elide(&long, 20);
        assert_eq!(clipped.chars().count(), 20);
        assert!(clipped.ends_with("[truncated]"));
    }
}
