use std::fmt;
use std::time::Duration;

/// Why no alert was sent for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuppressedReason {
    JourneyPassed,
    RetrySucceeded,
    InconsistentFailures,
    DuplicateWithinCooldown,
}

impl SuppressedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuppressedReason::JourneyPassed => "journey passed",
            SuppressedReason::RetrySucceeded => "retry succeeded",
            SuppressedReason::InconsistentFailures => "inconsistent failures across retries",
            SuppressedReason::DuplicateWithinCooldown => "duplicate within cooldown",
        }
    }
}

impl fmt::Display for SuppressedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDecision {
    pub should_alert: bool,
    /// Set exactly when `should_alert` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppressed_reason: Option<SuppressedReason>,
    /// The text handed to the notifier when `should_alert` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pass_notice_sent: bool,
}

impl AlertDecision {
    pub fn alert(message: String, fingerprint: String) -> Self {
        Self {
            should_alert: true,
            suppressed_reason: None,
            message: Some(message),
            fingerprint: Some(fingerprint),
            pass_notice_sent: false,
        }
    }

    pub fn suppressed(reason: SuppressedReason) -> Self {
        Self {
            should_alert: false,
            suppressed_reason: Some(reason),
            message: None,
            fingerprint: None,
            pass_notice_sent: false,
        }
    }
}

/// What the attempts so far call for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assessment {
    /// First attempt passed.
    Passed,
    /// A later attempt passed after earlier failures.
    RetrySucceeded,
    /// Run the journey again after `delay`.
    Retry { delay: Duration },
    /// Enough consecutive attempts failed on the same step.
    Escalate,
    /// Attempts ran out without the failures agreeing on a step.
    Inconsistent,
}
