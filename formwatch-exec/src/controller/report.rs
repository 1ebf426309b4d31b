use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::alert::AlertDecision;
use crate::executor::{JourneyResult, RunMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Init,
    BrowserReady,
    Executing,
    Passed,
    FailedAlerted,
    FailedSuppressed,
    Teardown,
    Done,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Init => "INIT",
            RunState::BrowserReady => "BROWSER_READY",
            RunState::Executing => "EXECUTING",
            RunState::Passed => "PASSED",
            RunState::FailedAlerted => "FAILED_ALERTED",
            RunState::FailedSuppressed => "FAILED_SUPPRESSED",
            RunState::Teardown => "TEARDOWN",
            RunState::Done => "DONE",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    Passed,
    Alerted,
    Suppressed,
    InfrastructureError,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Passed => "passed",
            RunStatus::Alerted => "alerted",
            RunStatus::Suppressed => "suppressed",
            RunStatus::InfrastructureError => "infrastructure-error",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Passed | RunStatus::Suppressed => 0,
            RunStatus::Alerted => 1,
            RunStatus::InfrastructureError => 2,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: Uuid,
    pub journey_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
    pub attempts: Vec<JourneyResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<AlertDecision>,
    /// Set when `status` is `infrastructure-error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub transitions: Vec<RunState>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub screenshots: Vec<PathBuf>,
    pub metrics: RunMetrics,
}

impl RunReport {
    pub fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }

    pub fn last_attempt(&self) -> Option<&JourneyResult> {
        self.attempts.last()
    }
}
