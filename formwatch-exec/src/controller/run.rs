use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use formwatch_core::{Journey, Settings};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::alert::{AlertContext, AlertDecision, AlertDispatcher, Assessment, DispatchError, SuppressedReason};
use crate::browser::{BrowserError, BrowserLauncher, BrowserSession, Page};
use crate::controller::report::{RunReport, RunState, RunStatus};
use crate::controller::screenshot::{screenshot_path, ScreenshotConfig};
use crate::executor::{
    AttemptContext, Event, EventSink, ExecutionError, ExecutorConfig, JourneyExecutor,
    JourneyResult, MetricsCollector, MetricsEventSink, ResolvedValues, ValueError, ValueResolver,
};

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub launch_timeout: Duration,
    pub teardown_timeout: Duration,
    pub screenshots: ScreenshotConfig,
    /// Whole-run budget. Reaching it is treated like an external cancellation.
    pub deadline: Option<Duration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            launch_timeout: Duration::from_secs(30),
            teardown_timeout: Duration::from_secs(10),
            screenshots: ScreenshotConfig::default(),
            deadline: None,
        }
    }
}

/// Failures of the monitor itself. Each one ends the run with `infrastructure-error`.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("browser failed to start: {0}")]
    Launch(BrowserError),
    #[error("browser did not start within {0:?}")]
    LaunchTimeout(Duration),
    #[error("could not open journey page: {0}")]
    Navigation(BrowserError),
    #[error("could not resolve input values: {0}")]
    Values(#[from] ValueError),
    #[error("journey execution failed: {0}")]
    Execution(ExecutionError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("run cancelled")]
    Cancelled,
    #[error("run deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

enum AttemptEnd {
    Retry { delay: Duration },
    Finished {
        status: RunStatus,
        decision: AlertDecision,
    },
}

struct RunTrace {
    transitions: Vec<RunState>,
    attempts: Vec<JourneyResult>,
    screenshots: Vec<PathBuf>,
}

impl RunTrace {
    fn enter(&mut self, state: RunState) {
        tracing::debug!(state = %state, "run state");
        self.transitions.push(state);
    }
}

pub struct RunController {
    launcher: Arc<dyn BrowserLauncher>,
    resolver: Arc<ValueResolver>,
    dispatcher: Arc<AlertDispatcher>,
    events: Arc<dyn EventSink>,
    config: RunConfig,
}

impl RunController {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        resolver: Arc<ValueResolver>,
        dispatcher: Arc<AlertDispatcher>,
        events: Arc<dyn EventSink>,
        config: RunConfig,
    ) -> Self {
        Self {
            launcher,
            resolver,
            dispatcher,
            events,
            config,
        }
    }

    /// Runs `journey` until the dispatcher reaches a verdict or the monitor itself fails.
    ///
    /// Never returns an error: infrastructure problems are folded into the report with
    /// status `infrastructure-error`. Every launched browser is closed before this returns.
    pub async fn run(
        &self,
        journey: &Journey,
        settings: &Settings,
        cancel: &CancellationToken,
    ) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id, journey_id = %journey.journey_id);
        self.run_with_id(run_id, journey, settings, cancel)
            .instrument(span)
            .await
    }

    async fn run_with_id(
        &self,
        run_id: Uuid,
        journey: &Journey,
        settings: &Settings,
        cancel: &CancellationToken,
    ) -> RunReport {
        let started_at = Utc::now();
        let collector = Arc::new(MetricsCollector::new(run_id, journey.journey_id.clone()));
        let events: Arc<dyn EventSink> =
            Arc::new(MetricsEventSink::new(collector.clone(), self.events.clone()));
        tracing::info!(url = %journey.url, "run started");

        events
            .emit(Event::RunStarted {
                run_id,
                journey_id: journey.journey_id.clone(),
            })
            .await;

        let token = cancel.child_token();
        let deadline_task = self.config.deadline.map(|deadline| {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(deadline) => token.cancel(),
                }
            })
        });

        let mut trace = RunTrace {
            transitions: vec![RunState::Init],
            attempts: Vec::new(),
            screenshots: Vec::new(),
        };

        let executor = JourneyExecutor::new(ExecutorConfig::from_settings(settings), events.clone());
        let outcome = self
            .drive(run_id, started_at, journey, &executor, &events, &token, &mut trace)
            .await
            .map_err(|e| self.cancellation_cause(e, cancel));

        if let Some(task) = deadline_task {
            task.abort();
        }
        if trace.transitions.last() != Some(&RunState::Teardown) {
            // Nothing was launched, or the failure came after the last teardown.
            trace.enter(RunState::Teardown);
        }
        trace.enter(RunState::Done);

        let (status, alert, error) = match outcome {
            Ok((status, decision)) => (status, Some(decision), None),
            Err(e) => {
                tracing::error!(error = %e, "run ended with an infrastructure error");
                (RunStatus::InfrastructureError, None, Some(e.to_string()))
            }
        };

        events.emit(Event::RunFinished { run_id, status }).await;
        tracing::info!(status = %status, attempts = trace.attempts.len(), "run finished");

        RunReport {
            run_id,
            journey_id: journey.journey_id.clone(),
            started_at,
            finished_at: Utc::now(),
            status,
            attempts: trace.attempts,
            alert,
            error,
            transitions: trace.transitions,
            screenshots: trace.screenshots,
            metrics: collector.get_metrics().await,
        }
    }

    /// A cancelled child token means either the caller cancelled or the deadline fired.
    fn cancellation_cause(&self, e: RunError, external: &CancellationToken) -> RunError {
        match e {
            RunError::Cancelled | RunError::Execution(ExecutionError::Cancelled) => {
                match self.config.deadline {
                    Some(deadline) if !external.is_cancelled() => {
                        RunError::DeadlineExceeded(deadline)
                    }
                    _ => RunError::Cancelled,
                }
            }
            other => other,
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn drive(
        &self,
        run_id: Uuid,
        started_at: chrono::DateTime<Utc>,
        journey: &Journey,
        executor: &JourneyExecutor,
        events: &Arc<dyn EventSink>,
        token: &CancellationToken,
        trace: &mut RunTrace,
    ) -> Result<(RunStatus, AlertDecision), RunError> {
        loop {
            let attempt = trace.attempts.len() as u32 + 1;
            let ctx = AttemptContext { run_id, attempt };

            // Fresh values per attempt, resolved before any browser exists.
            let values = self.resolver.resolve(journey).await?;

            let session = self.launch(token).await?;

            events.emit(Event::AttemptStarted { run_id, attempt }).await;
            let result = self
                .attempt(ctx, started_at, journey, executor, &*session, &values, events, token, trace)
                .await;

            trace.enter(RunState::Teardown);
            self.teardown(&*session).await;

            match result? {
                AttemptEnd::Finished { status, decision } => return Ok((status, decision)),
                AttemptEnd::Retry { delay } => {
                    events
                        .emit(Event::RetryScheduled {
                            run_id,
                            next_attempt: attempt + 1,
                            delay_ms: delay.as_millis() as u64,
                        })
                        .await;
                    tracing::info!(next_attempt = attempt + 1, delay_ms = delay.as_millis() as u64, "retrying journey");
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => return Err(RunError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    async fn launch(&self, token: &CancellationToken) -> Result<Box<dyn BrowserSession>, RunError> {
        let launched = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(RunError::Cancelled),
            r = tokio::time::timeout(self.config.launch_timeout, self.launcher.launch()) => r,
        };
        match launched {
            Err(_) => Err(RunError::LaunchTimeout(self.config.launch_timeout)),
            Ok(Err(e)) => Err(RunError::Launch(e)),
            Ok(Ok(session)) => Ok(session),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn attempt(
        &self,
        ctx: AttemptContext,
        started_at: chrono::DateTime<Utc>,
        journey: &Journey,
        executor: &JourneyExecutor,
        session: &dyn BrowserSession,
        values: &ResolvedValues,
        events: &Arc<dyn EventSink>,
        token: &CancellationToken,
        trace: &mut RunTrace,
    ) -> Result<AttemptEnd, RunError> {
        let page = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(RunError::Cancelled),
            r = session.new_page(&journey.url) => r.map_err(RunError::Navigation)?,
        };
        trace.enter(RunState::BrowserReady);

        trace.enter(RunState::Executing);
        let result = executor
            .execute(ctx, journey, &*page, values, token)
            .await
            .map_err(RunError::Execution)?;
        let passed = result.passed();
        events
            .emit(Event::AttemptFinished {
                run_id: ctx.run_id,
                attempt: ctx.attempt,
                passed,
            })
            .await;

        let mut screenshot = None;
        if self.config.screenshots.policy.wants(!passed) {
            let failed_step = result.failed_step().map(|s| s.step_id.as_str());
            let path = screenshot_path(
                &self.config.screenshots.dir,
                &journey.journey_id,
                failed_step,
                ctx.attempt,
                Utc::now(),
            );
            match self.capture(&*page, &path).await {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "screenshot saved");
                    trace.screenshots.push(path.clone());
                    screenshot = Some(path);
                }
                Err(e) => tracing::warn!(error = %e, path = %path.display(), "screenshot failed"),
            }
        }

        trace.attempts.push(result);
        let assessment = self.dispatcher.assess(&trace.attempts)?;
        if let Assessment::Retry { delay } = assessment {
            return Ok(AttemptEnd::Retry { delay });
        }

        let alert_ctx = AlertContext {
            run_id: ctx.run_id,
            journey_id: journey.journey_id.clone(),
            url: journey.url.clone(),
            started_at,
            screenshot,
        };
        let decision = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(RunError::Cancelled),
            r = self.dispatcher.decide(&alert_ctx, &trace.attempts) => r?,
        };

        let (state, status) = match (assessment, decision.should_alert) {
            (_, true) => (RunState::FailedAlerted, RunStatus::Alerted),
            (Assessment::Passed, false) => (RunState::Passed, RunStatus::Passed),
            (_, false) => (RunState::FailedSuppressed, RunStatus::Suppressed),
        };
        trace.enter(state);

        if decision.should_alert {
            if let (Some(step), Some(fingerprint)) =
                (trace.attempts.last().and_then(|a| a.failed_step()), &decision.fingerprint)
            {
                events
                    .emit(Event::AlertSent {
                        run_id: ctx.run_id,
                        step_id: step.step_id.clone(),
                        fingerprint: fingerprint.clone(),
                    })
                    .await;
            }
        } else if let Some(reason) = decision.suppressed_reason {
            if reason != SuppressedReason::JourneyPassed {
                events
                    .emit(Event::AlertSuppressed {
                        run_id: ctx.run_id,
                        reason,
                    })
                    .await;
            }
        }
        if decision.pass_notice_sent {
            events.emit(Event::PassNoticeSent { run_id: ctx.run_id }).await;
        }

        Ok(AttemptEnd::Finished { status, decision })
    }

    async fn capture(&self, page: &dyn Page, path: &std::path::Path) -> Result<(), BrowserError> {
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| BrowserError::Protocol(format!("create {}: {e}", dir.display())))?;
        }
        page.screenshot(path).await
    }

    /// Errors here are logged only; the run's status is already decided.
    async fn teardown(&self, session: &dyn BrowserSession) {
        match tokio::time::timeout(self.config.teardown_timeout, session.close()).await {
            Ok(Ok(())) => tracing::debug!("browser closed"),
            Ok(Err(e)) => tracing::warn!(error = %e, "browser close failed"),
            Err(_) => tracing::warn!(timeout = ?self.config.teardown_timeout, "browser close timed out"),
        }
    }
}
