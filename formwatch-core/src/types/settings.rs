use std::time::Duration;

use crate::types::Extensions;

/// Document-wide knobs. Every field has a default so the whole block may be omitted.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "pollIntervalMs")]
    pub poll_interval_ms: u64,

    #[serde(rename = "defaultTimeoutMs")]
    pub default_timeout_ms: u64,

    /// Upper bound for a single click/fill/select call.
    #[serde(rename = "actionTimeoutMs")]
    pub action_timeout_ms: u64,

    #[serde(rename = "navigationTimeoutMs")]
    pub navigation_timeout_ms: u64,

    /// Full-journey retries before a failure escalates to an alert.
    pub retries: u32,

    #[serde(rename = "alertCooldownSeconds")]
    pub alert_cooldown_seconds: u64,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            default_timeout_ms: 10_000,
            action_timeout_ms: 10_000,
            navigation_timeout_ms: 30_000,
            retries: 1,
            alert_cooldown_seconds: 3600,
            extensions: Extensions::new(),
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn alert_cooldown(&self) -> Duration {
        Duration::from_secs(self.alert_cooldown_seconds)
    }
}
