use std::time::Duration;

use crate::types::{Action, Expectation, Extensions, Settings};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StepDefinition {
    #[serde(rename = "stepId")]
    pub step_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub action: Action,

    pub expectation: Expectation,

    /// Overrides `settings.defaultTimeoutMs` for this step's expectation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "timeoutMs")]
    pub timeout_ms: Option<u64>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

impl StepDefinition {
    pub fn timeout(&self, settings: &Settings) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(settings.default_timeout_ms))
    }
}
