use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::controller::RunStatus;
use crate::executor::{Event, EventSink};

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RunMetrics {
    pub run_id: uuid::Uuid,
    pub journey_id: String,
    pub status: Option<RunStatus>,
    #[serde(skip)]
    pub started_at: Option<Instant>,
    #[serde(skip)]
    pub total_duration: Option<Duration>,
    pub attempts: u32,
    pub retries: u32,
    pub steps_passed: usize,
    pub steps_failed: usize,
    pub steps_skipped: usize,
    pub alerts_sent: usize,
    pub alerts_suppressed: usize,
}

impl RunMetrics {
    pub fn new(run_id: uuid::Uuid, journey_id: String) -> Self {
        Self {
            run_id,
            journey_id,
            started_at: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn finish(&mut self, status: RunStatus) {
        self.status = Some(status);
        if let Some(started) = self.started_at {
            self.total_duration = Some(started.elapsed());
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "run_id": self.run_id.to_string(),
            "journey_id": self.journey_id,
            "status": self.status.map(|s| s.as_str()),
            "duration_ms": self.total_duration.map(|d| d.as_millis() as u64),
            "attempts": self.attempts,
            "retries": self.retries,
            "steps": {
                "passed": self.steps_passed,
                "failed": self.steps_failed,
                "skipped": self.steps_skipped,
            },
            "alerts": {
                "sent": self.alerts_sent,
                "suppressed": self.alerts_suppressed,
            },
        })
    }

    fn record(&mut self, event: &Event) {
        match event {
            Event::AttemptStarted { .. } => self.attempts += 1,
            Event::RetryScheduled { .. } => self.retries += 1,
            Event::StepPassed { .. } => self.steps_passed += 1,
            Event::StepFailed { .. } => self.steps_failed += 1,
            Event::StepSkipped { .. } => self.steps_skipped += 1,
            Event::AlertSent { .. } => self.alerts_sent += 1,
            Event::AlertSuppressed { .. } => self.alerts_suppressed += 1,
            Event::RunFinished { status, .. } => self.finish(*status),
            _ => {}
        }
    }
}

pub struct MetricsCollector {
    metrics: Mutex<RunMetrics>,
}

impl MetricsCollector {
    pub fn new(run_id: uuid::Uuid, journey_id: String) -> Self {
        Self {
            metrics: Mutex::new(RunMetrics::new(run_id, journey_id)),
        }
    }

    pub async fn record(&self, event: &Event) {
        self.metrics.lock().await.record(event);
    }

    pub async fn get_metrics(&self) -> RunMetrics {
        self.metrics.lock().await.clone()
    }
}

/// Counts events into a [`MetricsCollector`] then forwards them to `base`.
pub struct MetricsEventSink {
    collector: Arc<MetricsCollector>,
    base: Arc<dyn EventSink>,
}

impl MetricsEventSink {
    pub fn new(collector: Arc<MetricsCollector>, base: Arc<dyn EventSink>) -> Self {
        Self { collector, base }
    }
}

#[async_trait]
impl EventSink for MetricsEventSink {
    async fn emit(&self, event: Event) {
        self.collector.record(&event).await;
        self.base.emit(event).await;
    }
}
