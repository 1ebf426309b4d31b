use std::collections::BTreeMap;

use crate::browser::BrowserError;
use crate::classify::Deviation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overall {
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    pub step_id: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_value: Option<String>,
    pub elapsed_ms: u64,
    /// Present only when `status` is `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation: Option<Deviation>,
}

impl StepOutcome {
    pub fn skipped(step_id: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepStatus::Skipped,
            observed_value: None,
            elapsed_ms: 0,
            deviation: None,
        }
    }
}

/// One full pass over a journey. `steps` mirrors the journey's step list one-to-one.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyResult {
    pub journey_id: String,
    pub attempt: u32,
    pub steps: Vec<StepOutcome>,
    pub overall: Overall,
    pub elapsed_ms: u64,
    /// Non-secret generated inputs by step id (e.g. the coupon code that was typed).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub generated_values: BTreeMap<String, String>,
}

impl JourneyResult {
    pub fn passed(&self) -> bool {
        self.overall == Overall::Passed
    }

    pub fn failed_step(&self) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.status == StepStatus::Failed)
    }

    pub fn deviation(&self) -> Option<&Deviation> {
        self.failed_step().and_then(|s| s.deviation.as_ref())
    }

    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }
}

/// Failures of the monitor itself while walking a journey. Form misbehaviour is never an
/// `ExecutionError`; it is a failed [`StepOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("run cancelled")]
    Cancelled,
    #[error(transparent)]
    Browser(#[from] BrowserError),
    #[error("no resolved input value for step {0}")]
    MissingValue(String),
    #[error("step {step_id}: invalid pattern: {message}")]
    InvalidPattern { step_id: String, message: String },
}
