use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use formwatch_exec::executor::{Event, EventSink};

/// Single-line step counter on stderr. Counts reset at every attempt.
pub struct ProgressEventSink {
    steps_per_journey: BTreeMap<String, usize>,
    total_steps: AtomicUsize,
    attempt: AtomicUsize,
    passed: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
}

impl ProgressEventSink {
    pub fn new(steps_per_journey: BTreeMap<String, usize>) -> Self {
        Self {
            steps_per_journey,
            total_steps: AtomicUsize::new(0),
            attempt: AtomicUsize::new(0),
            passed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
        }
    }

    fn reset(&self, attempt: u32) {
        self.attempt.store(attempt as usize, Ordering::Relaxed);
        self.passed.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.skipped.store(0, Ordering::Relaxed);
    }

    fn update_progress(&self) {
        let passed = self.passed.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let skipped = self.skipped.load(Ordering::Relaxed);
        let done = passed + failed + skipped;
        let total = self.total_steps.load(Ordering::Relaxed);
        let percent = if total > 0 { (done * 100) / total } else { 0 };
        eprint!(
            "\rattempt {}: [{}/{}] {}% (✓{} ✗{} -{})",
            self.attempt.load(Ordering::Relaxed),
            done,
            total,
            percent,
            passed,
            failed,
            skipped
        );
        if done >= total {
            eprintln!();
        }
    }
}

#[async_trait]
impl EventSink for ProgressEventSink {
    async fn emit(&self, event: Event) {
        match event {
            Event::RunStarted { journey_id, .. } => {
                let total = self.steps_per_journey.get(&journey_id).copied().unwrap_or(0);
                self.total_steps.store(total, Ordering::Relaxed);
            }
            Event::AttemptStarted { attempt, .. } => self.reset(attempt),
            Event::StepPassed { .. } => {
                self.passed.fetch_add(1, Ordering::Relaxed);
                self.update_progress();
            }
            Event::StepFailed { .. } => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                self.update_progress();
            }
            Event::StepSkipped { .. } => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                self.update_progress();
            }
            _ => {}
        }
    }
}
