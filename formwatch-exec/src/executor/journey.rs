use std::sync::Arc;

use formwatch_core::Journey;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::browser::Page;
use crate::classify::{classify, FailureSignal};
use crate::executor::step_runner::{run_step, StepRun};
use crate::executor::{
    AttemptContext, Event, EventSink, ExecutionError, ExecutorConfig, JourneyResult, Overall,
    ResolvedValues, StepOutcome, StepStatus,
};

/// Walks a journey's steps in order against one page, stopping at the first failure.
pub struct JourneyExecutor {
    config: ExecutorConfig,
    events: Arc<dyn EventSink>,
}

impl JourneyExecutor {
    pub fn new(config: ExecutorConfig, events: Arc<dyn EventSink>) -> Self {
        Self { config, events }
    }

    pub async fn execute(
        &self,
        ctx: AttemptContext,
        journey: &Journey,
        page: &dyn Page,
        values: &ResolvedValues,
        cancel: &CancellationToken,
    ) -> Result<JourneyResult, ExecutionError> {
        let started = Instant::now();
        let mut outcomes = Vec::with_capacity(journey.steps.len());
        let mut failed = false;

        for step in &journey.steps {
            if failed {
                outcomes.push(StepOutcome::skipped(&step.step_id));
                self.events
                    .emit(Event::StepSkipped {
                        run_id: ctx.run_id,
                        step_id: step.step_id.clone(),
                        attempt: ctx.attempt,
                    })
                    .await;
                continue;
            }

            self.events
                .emit(Event::StepStarted {
                    run_id: ctx.run_id,
                    step_id: step.step_id.clone(),
                    attempt: ctx.attempt,
                })
                .await;
            tracing::debug!(step_id = %step.step_id, action = %step.action.kind(), "step started");

            let step_started = Instant::now();
            let run = run_step(page, step, values, &self.config, cancel).await?;
            let elapsed_ms = step_started.elapsed().as_millis() as u64;

            match run {
                StepRun::Passed { observed } => {
                    tracing::debug!(step_id = %step.step_id, elapsed_ms, "step passed");
                    self.events
                        .emit(Event::StepPassed {
                            run_id: ctx.run_id,
                            step_id: step.step_id.clone(),
                            attempt: ctx.attempt,
                            elapsed_ms,
                        })
                        .await;
                    outcomes.push(StepOutcome {
                        step_id: step.step_id.clone(),
                        status: StepStatus::Passed,
                        observed_value: observed.map(|o| values.redact(&o)),
                        elapsed_ms,
                        deviation: None,
                    });
                }
                StepRun::Failed(signal) => {
                    let mut deviation = classify(step, &signal);
                    deviation.observed = values.redact(&deviation.observed);
                    deviation.expected = values.redact(&deviation.expected);

                    tracing::info!(
                        step_id = %step.step_id,
                        kind = %deviation.kind,
                        severity = %deviation.severity,
                        expected = %deviation.expected,
                        observed = %deviation.observed,
                        "step failed"
                    );
                    self.events
                        .emit(Event::StepFailed {
                            run_id: ctx.run_id,
                            step_id: step.step_id.clone(),
                            attempt: ctx.attempt,
                            kind: deviation.kind,
                            severity: deviation.severity,
                        })
                        .await;

                    let observed_value = match &signal {
                        FailureSignal::ExpectationUnmet(record) => {
                            record.last_observed.as_deref().map(|o| values.redact(o))
                        }
                        FailureSignal::ActionError { .. } => None,
                    };
                    outcomes.push(StepOutcome {
                        step_id: step.step_id.clone(),
                        status: StepStatus::Failed,
                        observed_value,
                        elapsed_ms,
                        deviation: Some(deviation),
                    });
                    failed = true;
                }
            }
        }

        Ok(JourneyResult {
            journey_id: journey.journey_id.clone(),
            attempt: ctx.attempt,
            steps: outcomes,
            overall: if failed { Overall::Failed } else { Overall::Passed },
            elapsed_ms: started.elapsed().as_millis() as u64,
            generated_values: values.generated(),
        })
    }
}
