use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use formwatch_store::FingerprintStore;
use uuid::Uuid;

use crate::alert::decision::{AlertDecision, Assessment, SuppressedReason};
use crate::alert::fingerprint::fingerprint;
use crate::alert::message::{render_alert, render_pass_notice, MessageParts};
use crate::executor::JourneyResult;
use crate::notify::{Notifier, NotifyError};
use crate::retry::{backoff_delay, RetryConfig};

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub retry: RetryConfig,
    pub cooldown: Duration,
    /// Send an informational message when a journey passes.
    pub notify_on_pass: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            cooldown: Duration::from_secs(3600),
            notify_on_pass: false,
        }
    }
}

/// Run facts the dispatcher puts into messages.
#[derive(Debug, Clone)]
pub struct AlertContext {
    pub run_id: Uuid,
    pub journey_id: String,
    pub url: String,
    pub started_at: DateTime<Utc>,
    pub screenshot: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("failed to deliver notification: {0}")]
    Notify(#[from] NotifyError),
    #[error("no journey attempts to assess")]
    NoAttempts,
    #[error("another attempt is pending; nothing to decide yet")]
    RetryPending,
}

pub struct AlertDispatcher {
    store: Arc<dyn FingerprintStore>,
    notifier: Arc<dyn Notifier>,
    config: DispatchConfig,
    rng: Mutex<fastrand::Rng>,
}

impl AlertDispatcher {
    pub fn new(
        store: Arc<dyn FingerprintStore>,
        notifier: Arc<dyn Notifier>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Makes retry jitter reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(fastrand::Rng::with_seed(seed));
        self
    }

    /// Looks at the attempts so far (oldest first) and says whether to stop or try again.
    ///
    /// A failure escalates once the trailing run of failed attempts that all broke on the same
    /// step reaches `retries + 1`. Until then another attempt is requested while any remain.
    pub fn assess(&self, attempts: &[JourneyResult]) -> Result<Assessment, DispatchError> {
        let last = attempts.last().ok_or(DispatchError::NoAttempts)?;

        if last.passed() {
            return Ok(if attempts.len() == 1 {
                Assessment::Passed
            } else {
                Assessment::RetrySucceeded
            });
        }

        let failed_step = last.failed_step().map(|s| s.step_id.as_str());
        let streak = attempts
            .iter()
            .rev()
            .take_while(|a| !a.passed() && a.failed_step().map(|s| s.step_id.as_str()) == failed_step)
            .count();

        let max_attempts = self.config.retry.max_attempts();
        if streak >= max_attempts {
            return Ok(Assessment::Escalate);
        }
        if attempts.len() < max_attempts {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            let delay = backoff_delay(&self.config.retry, attempts.len(), || rng.u64(..));
            return Ok(Assessment::Retry { delay });
        }
        Ok(Assessment::Inconsistent)
    }

    /// Final word on a run. Sends at most one notification.
    ///
    /// A failed delivery is an error even though the deviation itself was classified; the
    /// fingerprint claim is released first so the next run can alert again.
    pub async fn decide(
        &self,
        ctx: &AlertContext,
        attempts: &[JourneyResult],
    ) -> Result<AlertDecision, DispatchError> {
        let assessment = self.assess(attempts)?;
        let last = attempts.last().ok_or(DispatchError::NoAttempts)?;
        let parts = MessageParts {
            run_id: ctx.run_id,
            journey_id: &ctx.journey_id,
            url: &ctx.url,
            started_at: ctx.started_at,
            attempts: attempts.len(),
            screenshot: ctx.screenshot.as_deref(),
        };

        match assessment {
            Assessment::Retry { .. } => Err(DispatchError::RetryPending),
            Assessment::Passed | Assessment::RetrySucceeded => {
                let reason = if assessment == Assessment::Passed {
                    SuppressedReason::JourneyPassed
                } else {
                    SuppressedReason::RetrySucceeded
                };
                let mut decision = AlertDecision::suppressed(reason);
                if self.config.notify_on_pass {
                    self.notifier.send(&render_pass_notice(&parts, last)).await?;
                    decision.pass_notice_sent = true;
                }
                if reason == SuppressedReason::RetrySucceeded {
                    tracing::info!(
                        journey_id = %ctx.journey_id,
                        attempts = attempts.len(),
                        "failure absorbed by retry"
                    );
                }
                Ok(decision)
            }
            Assessment::Inconsistent => {
                let steps: Vec<&str> = attempts
                    .iter()
                    .filter_map(|a| a.failed_step().map(|s| s.step_id.as_str()))
                    .collect();
                tracing::warn!(
                    journey_id = %ctx.journey_id,
                    failed_steps = ?steps,
                    "attempts failed on different steps; not alerting"
                );
                Ok(AlertDecision::suppressed(SuppressedReason::InconsistentFailures))
            }
            Assessment::Escalate => {
                let Some(deviation) = last.deviation() else {
                    // A failed attempt always carries a deviation on its failed step.
                    return Ok(AlertDecision::suppressed(SuppressedReason::InconsistentFailures));
                };
                let key = fingerprint(&ctx.journey_id, &deviation.step_id, deviation.kind);

                let claim = match self.store.check_and_set(&key, self.config.cooldown).await {
                    Ok(true) => Some(ClaimGuard::new(self.store.clone(), key.clone())),
                    Ok(false) => {
                        tracing::info!(
                            journey_id = %ctx.journey_id,
                            step_id = %deviation.step_id,
                            kind = %deviation.kind,
                            fingerprint = %key,
                            "duplicate alert suppressed"
                        );
                        return Ok(AlertDecision::suppressed(
                            SuppressedReason::DuplicateWithinCooldown,
                        ));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "fingerprint store unavailable; alerting anyway");
                        None
                    }
                };

                let message = render_alert(&parts, deviation, last);
                if let Err(e) = self.notifier.send(&message).await {
                    tracing::error!(error = %e, fingerprint = %key, "alert delivery failed");
                    if let Some(claim) = claim {
                        claim.release().await;
                    }
                    return Err(DispatchError::Notify(e));
                }
                if let Some(claim) = claim {
                    claim.keep();
                }
                Ok(AlertDecision::alert(message, key))
            }
        }
    }
}

/// A fingerprint claimed for an alert that has not been delivered yet.
///
/// Dropping the guard without `keep` releases the claim, so a send abandoned by cancellation
/// does not hold the cooldown for an alert nobody received.
struct ClaimGuard {
    store: Option<Arc<dyn FingerprintStore>>,
    key: String,
}

impl ClaimGuard {
    fn new(store: Arc<dyn FingerprintStore>, key: String) -> Self {
        Self {
            store: Some(store),
            key,
        }
    }

    /// The alert went out; the claim stands for the cooldown.
    fn keep(mut self) {
        self.store = None;
    }

    async fn release(mut self) {
        if let Some(store) = self.store.clone() {
            if let Err(e) = store.release(&self.key).await {
                tracing::warn!(error = %e, fingerprint = %self.key, "could not release fingerprint");
            }
        }
        self.store = None;
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        let Some(store) = self.store.take() else {
            return;
        };
        let key = std::mem::take(&mut self.key);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!(fingerprint = %key, "alert abandoned before delivery; releasing claim");
                handle.spawn(async move {
                    if let Err(e) = store.release(&key).await {
                        tracing::warn!(error = %e, fingerprint = %key, "could not release fingerprint");
                    }
                });
            }
            Err(_) => {
                tracing::warn!(fingerprint = %key, "no runtime to release abandoned fingerprint claim");
            }
        }
    }
}
