use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::alert::SuppressedReason;
use crate::classify::{DeviationKind, Severity};
use crate::controller::RunStatus;

#[derive(Debug, Clone)]
pub enum Event {
    RunStarted {
        run_id: Uuid,
        journey_id: String,
    },
    RunFinished {
        run_id: Uuid,
        status: RunStatus,
    },
    AttemptStarted {
        run_id: Uuid,
        attempt: u32,
    },
    AttemptFinished {
        run_id: Uuid,
        attempt: u32,
        passed: bool,
    },
    StepStarted {
        run_id: Uuid,
        step_id: String,
        attempt: u32,
    },
    StepPassed {
        run_id: Uuid,
        step_id: String,
        attempt: u32,
        elapsed_ms: u64,
    },
    StepFailed {
        run_id: Uuid,
        step_id: String,
        attempt: u32,
        kind: DeviationKind,
        severity: Severity,
    },
    StepSkipped {
        run_id: Uuid,
        step_id: String,
        attempt: u32,
    },
    RetryScheduled {
        run_id: Uuid,
        next_attempt: u32,
        delay_ms: u64,
    },
    AlertSent {
        run_id: Uuid,
        step_id: String,
        fingerprint: String,
    },
    AlertSuppressed {
        run_id: Uuid,
        reason: SuppressedReason,
    },
    PassNoticeSent {
        run_id: Uuid,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::RunStarted { .. } => "run.started",
            Event::RunFinished { .. } => "run.finished",
            Event::AttemptStarted { .. } => "attempt.started",
            Event::AttemptFinished { .. } => "attempt.finished",
            Event::StepStarted { .. } => "step.started",
            Event::StepPassed { .. } => "step.passed",
            Event::StepFailed { .. } => "step.failed",
            Event::StepSkipped { .. } => "step.skipped",
            Event::RetryScheduled { .. } => "retry.scheduled",
            Event::AlertSent { .. } => "alert.sent",
            Event::AlertSuppressed { .. } => "alert.suppressed",
            Event::PassNoticeSent { .. } => "pass_notice.sent",
        }
    }

    pub fn run_id(&self) -> Uuid {
        match self {
            Event::RunStarted { run_id, .. }
            | Event::RunFinished { run_id, .. }
            | Event::AttemptStarted { run_id, .. }
            | Event::AttemptFinished { run_id, .. }
            | Event::StepStarted { run_id, .. }
            | Event::StepPassed { run_id, .. }
            | Event::StepFailed { run_id, .. }
            | Event::StepSkipped { run_id, .. }
            | Event::RetryScheduled { run_id, .. }
            | Event::AlertSent { run_id, .. }
            | Event::AlertSuppressed { run_id, .. }
            | Event::PassNoticeSent { run_id } => *run_id,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let run_id = self.run_id().to_string();
        let ty = self.name();
        match self {
            Event::RunStarted { journey_id, .. } => {
                json!({ "type": ty, "run_id": run_id, "journey_id": journey_id })
            }
            Event::RunFinished { status, .. } => {
                json!({ "type": ty, "run_id": run_id, "status": status.as_str() })
            }
            Event::AttemptStarted { attempt, .. } => {
                json!({ "type": ty, "run_id": run_id, "attempt": attempt })
            }
            Event::AttemptFinished { attempt, passed, .. } => {
                json!({ "type": ty, "run_id": run_id, "attempt": attempt, "passed": passed })
            }
            Event::StepStarted { step_id, attempt, .. }
            | Event::StepSkipped { step_id, attempt, .. } => {
                json!({ "type": ty, "run_id": run_id, "step_id": step_id, "attempt": attempt })
            }
            Event::StepPassed { step_id, attempt, elapsed_ms, .. } => {
                json!({ "type": ty, "run_id": run_id, "step_id": step_id, "attempt": attempt, "elapsed_ms": elapsed_ms })
            }
            Event::StepFailed { step_id, attempt, kind, severity, .. } => {
                json!({ "type": ty, "run_id": run_id, "step_id": step_id, "attempt": attempt, "kind": kind.as_str(), "severity": severity.as_str() })
            }
            Event::RetryScheduled { next_attempt, delay_ms, .. } => {
                json!({ "type": ty, "run_id": run_id, "next_attempt": next_attempt, "delay_ms": delay_ms })
            }
            Event::AlertSent { step_id, fingerprint, .. } => {
                json!({ "type": ty, "run_id": run_id, "step_id": step_id, "fingerprint": fingerprint })
            }
            Event::AlertSuppressed { reason, .. } => {
                json!({ "type": ty, "run_id": run_id, "reason": reason.as_str() })
            }
            Event::PassNoticeSent { .. } => json!({ "type": ty, "run_id": run_id }),
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// One JSON object per line on stdout.
pub struct StdoutEventSink;

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn emit(&self, event: Event) {
        println!("{}", serde_json::to_string(&event.to_json()).unwrap_or_default());
    }
}

/// Forwards events to `tracing` so they land in the same log stream as everything else.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: Event) {
        let run_id = event.run_id();
        match &event {
            Event::StepFailed { step_id, attempt, kind, severity, .. } => {
                tracing::warn!(%run_id, step_id = %step_id, attempt, kind = kind.as_str(), severity = severity.as_str(), "step failed");
            }
            Event::AlertSent { step_id, fingerprint, .. } => {
                tracing::info!(%run_id, step_id = %step_id, fingerprint = %fingerprint, "alert sent");
            }
            Event::AlertSuppressed { reason, .. } => {
                tracing::info!(%run_id, reason = reason.as_str(), "alert suppressed");
            }
            Event::RunFinished { status, .. } => {
                tracing::info!(%run_id, status = status.as_str(), "run finished");
            }
            Event::RetryScheduled { next_attempt, delay_ms, .. } => {
                tracing::info!(%run_id, next_attempt, delay_ms, "retry scheduled");
            }
            other => {
                tracing::debug!(%run_id, event = other.name(), payload = %other.to_json(), "event");
            }
        }
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_failed_json_carries_kind_and_severity() {
        let run_id = Uuid::nil();
        let event = Event::StepFailed {
            run_id,
            step_id: "popup-message".into(),
            attempt: 2,
            kind: DeviationKind::ValueMismatch,
            severity: Severity::Major,
        };
        let v = event.to_json();
        assert_eq!(v["type"], "step.failed");
        assert_eq!(v["kind"], "value-mismatch");
        assert_eq!(v["severity"], "major");
        assert_eq!(v["attempt"], 2);
        assert_eq!(v["run_id"], run_id.to_string());
    }

    #[test]
    fn suppression_reason_is_rendered_as_string() {
        let event = Event::AlertSuppressed {
            run_id: Uuid::nil(),
            reason: SuppressedReason::DuplicateWithinCooldown,
        };
        assert_eq!(event.to_json()["reason"], "duplicate within cooldown");
    }

    struct Counting(std::sync::Arc<std::sync::atomic::AtomicUsize>);

    #[async_trait]
    impl EventSink for Counting {
        async fn emit(&self, _event: Event) {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn composite_fans_out_to_every_sink() {
        let seen = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut sinks = CompositeEventSink::new();
        assert!(sinks.is_empty());
        sinks.add(Box::new(Counting(seen.clone())));
        sinks.add(Box::new(Counting(seen.clone())));

        sinks.emit(Event::PassNoticeSent { run_id: Uuid::nil() }).await;

        assert_eq!(sinks.len(), 2);
        assert_eq!(seen.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
