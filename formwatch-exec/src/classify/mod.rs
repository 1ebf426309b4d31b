//! Turns a failed step's raw signal into a [`Deviation`].

use std::fmt;

use formwatch_core::{Expectation, StepDefinition};

use crate::executor::PollRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviationKind {
    Timeout,
    ValueMismatch,
    ElementMissing,
    ElementUnexpectedlyPresent,
    ActionRaisedError,
}

impl DeviationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviationKind::Timeout => "timeout",
            DeviationKind::ValueMismatch => "value-mismatch",
            DeviationKind::ElementMissing => "element-missing",
            DeviationKind::ElementUnexpectedlyPresent => "element-unexpectedly-present",
            DeviationKind::ActionRaisedError => "action-raised-error",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DeviationKind::ElementMissing | DeviationKind::ActionRaisedError => Severity::Critical,
            DeviationKind::ValueMismatch | DeviationKind::ElementUnexpectedlyPresent => {
                Severity::Major
            }
            DeviationKind::Timeout => Severity::Minor,
        }
    }
}

impl fmt::Display for DeviationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Major => "major",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deviation {
    pub step_id: String,
    pub kind: DeviationKind,
    pub severity: Severity,
    pub expected: String,
    pub observed: String,
}

/// Why a step failed, as seen by the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureSignal {
    /// The action itself reported an error (element not found, not interactable).
    ActionError { message: String },
    /// The expectation never held before its deadline. An action that timed out without
    /// erroring is reported here too, with an empty poll record.
    ExpectationUnmet(PollRecord),
}

/// Rules are checked in order and the first match wins, so a value that was seen but wrong
/// is reported as a mismatch rather than a generic timeout.
pub fn classify(step: &StepDefinition, signal: &FailureSignal) -> Deviation {
    let (kind, expected, observed) = match signal {
        FailureSignal::ActionError { message } => (
            DeviationKind::ActionRaisedError,
            describe_action(step),
            message.clone(),
        ),
        FailureSignal::ExpectationUnmet(record) => classify_unmet(&step.expectation, record),
    };

    Deviation {
        step_id: step.step_id.clone(),
        kind,
        severity: kind.severity(),
        expected,
        observed,
    }
}

fn classify_unmet(
    expectation: &Expectation,
    record: &PollRecord,
) -> (DeviationKind, String, String) {
    let expected = expectation.describe_expected();
    let selector = expectation.selector();

    match expectation {
        Expectation::ElementAbsent { .. } if record.last_present() => (
            DeviationKind::ElementUnexpectedlyPresent,
            expected,
            format!("`{selector}` still present after {} polls", record.polls),
        ),
        Expectation::ElementVisible { .. } | Expectation::ElementEnabled { .. } => {
            if !record.ever_found {
                (DeviationKind::ElementMissing, expected, never_appeared(selector, record))
            } else {
                (DeviationKind::Timeout, expected, describe_last_state(selector, record))
            }
        }
        Expectation::ElementTextEquals { .. } | Expectation::ElementTextMatchesPattern { .. } => {
            if !record.ever_found {
                (DeviationKind::ElementMissing, expected, never_appeared(selector, record))
            } else {
                (
                    DeviationKind::ValueMismatch,
                    expected,
                    record.last_observed.clone().unwrap_or_default(),
                )
            }
        }
        Expectation::ElementAbsent { .. } => (
            DeviationKind::Timeout,
            expected,
            format!("deadline exceeded after {} polls", record.polls),
        ),
    }
}

fn describe_action(step: &StepDefinition) -> String {
    match step.action.selector() {
        Some(selector) => format!("{} on `{selector}` succeeds", step.action.kind()),
        None => format!("{} succeeds", step.action.kind()),
    }
}

fn never_appeared(selector: &str, record: &PollRecord) -> String {
    match &record.last_error {
        Some(err) => format!("`{selector}` never appeared ({} polls, last error: {err})", record.polls),
        None => format!("`{selector}` never appeared ({} polls)", record.polls),
    }
}

fn describe_last_state(selector: &str, record: &PollRecord) -> String {
    match &record.last_state {
        Some(state) if !state.present => format!("`{selector}` disappeared"),
        Some(state) if !state.visible => format!("`{selector}` present but hidden"),
        Some(state) if !state.enabled => format!("`{selector}` present but disabled"),
        Some(_) => format!("`{selector}` did not settle"),
        None => format!("`{selector}` state unknown"),
    }
}

#[cfg(test)]
mod tests {
    use formwatch_core::types::Extensions;
    use formwatch_core::{Action, TextSource};

    use super::*;
    use crate::browser::ElementState;

    fn step(expectation: Expectation) -> StepDefinition {
        StepDefinition {
            step_id: "apply-coupon".into(),
            description: None,
            action: Action::Click {
                selector: "#apply".into(),
            },
            expectation,
            timeout_ms: Some(5000),
            extensions: Extensions::new(),
        }
    }

    fn seen(text: &str, visible: bool) -> PollRecord {
        PollRecord {
            polls: 20,
            ever_found: true,
            holds: false,
            last_state: Some(ElementState {
                present: true,
                visible,
                enabled: true,
                text: Some(text.into()),
                value: None,
                html: None,
            }),
            last_observed: Some(text.into()),
            last_error: None,
        }
    }

    fn never_seen() -> PollRecord {
        PollRecord {
            polls: 20,
            last_state: Some(ElementState::absent()),
            ..PollRecord::default()
        }
    }

    fn text_equals() -> Expectation {
        Expectation::ElementTextEquals {
            selector: "#discount-total".into(),
            expected: "$10.00 off".into(),
            source: TextSource::Text,
        }
    }

    #[test]
    fn action_error_wins_over_everything() {
        let d = classify(
            &step(text_equals()),
            &FailureSignal::ActionError {
                message: "no element matches `#apply`".into(),
            },
        );
        assert_eq!(d.kind, DeviationKind::ActionRaisedError);
        assert_eq!(d.expected, "click on `#apply` succeeds");
        assert_eq!(d.observed, "no element matches `#apply`");
    }

    #[test]
    fn present_absent_target_is_unexpectedly_present() {
        let s = step(Expectation::ElementAbsent {
            selector: "#popAlert.pop.on".into(),
        });
        let d = classify(&s, &FailureSignal::ExpectationUnmet(seen("", true)));
        assert_eq!(d.kind, DeviationKind::ElementUnexpectedlyPresent);
        assert_eq!(d.severity, Severity::Major);
    }

    #[test]
    fn visibility_distinguishes_missing_from_unsettled() {
        let s = step(Expectation::ElementVisible {
            selector: "#thanks".into(),
        });
        let missing = classify(&s, &FailureSignal::ExpectationUnmet(never_seen()));
        assert_eq!(missing.kind, DeviationKind::ElementMissing);
        assert_eq!(missing.severity, Severity::Critical);

        let hidden = classify(&s, &FailureSignal::ExpectationUnmet(seen("", false)));
        assert_eq!(hidden.kind, DeviationKind::Timeout);
        assert_eq!(hidden.observed, "`#thanks` present but hidden");
    }

    #[test]
    fn seen_but_wrong_text_is_a_mismatch_not_a_timeout() {
        let d = classify(
            &step(text_equals()),
            &FailureSignal::ExpectationUnmet(seen("$0.00 off", true)),
        );
        assert_eq!(d.kind, DeviationKind::ValueMismatch);
        assert_eq!(d.expected, "$10.00 off");
        assert_eq!(d.observed, "$0.00 off");

        let missing = classify(&step(text_equals()), &FailureSignal::ExpectationUnmet(never_seen()));
        assert_eq!(missing.kind, DeviationKind::ElementMissing);
    }

    #[test]
    fn absent_expectation_without_presence_falls_back_to_timeout() {
        let s = step(Expectation::ElementAbsent {
            selector: "#spinner".into(),
        });
        let d = classify(&s, &FailureSignal::ExpectationUnmet(PollRecord::default()));
        assert_eq!(d.kind, DeviationKind::Timeout);
        assert_eq!(d.severity, Severity::Minor);
    }

    #[test]
    fn classification_is_deterministic() {
        let s = step(text_equals());
        let signal = FailureSignal::ExpectationUnmet(seen("$0.00 off", true));
        assert_eq!(classify(&s, &signal), classify(&s, &signal));
    }

    #[test]
    fn deviation_serializes_camel_case() {
        let d = classify(&step(text_equals()), &FailureSignal::ExpectationUnmet(seen("$0.00 off", true)));
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["stepId"], "apply-coupon");
        assert_eq!(json["kind"], "value-mismatch");
        assert!(json.get("step_id").is_none());
    }
}
