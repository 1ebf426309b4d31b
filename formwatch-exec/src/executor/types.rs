use std::time::Duration;

use formwatch_core::{Settings, StepDefinition};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub poll_interval: Duration,
    pub default_timeout: Duration,
    pub action_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl ExecutorConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            poll_interval: settings.poll_interval(),
            default_timeout: settings.default_timeout(),
            action_timeout: settings.action_timeout(),
        }
    }

    pub fn step_timeout(&self, step: &StepDefinition) -> Duration {
        step.timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.default_timeout)
    }
}

/// Identifies one journey attempt within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptContext {
    pub run_id: Uuid,
    /// 1-based.
    pub attempt: u32,
}
