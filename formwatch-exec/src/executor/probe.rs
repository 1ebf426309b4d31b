use std::time::Duration;

use formwatch_core::Expectation;
use regex::Regex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::browser::{BrowserError, ElementState, Page};
use crate::executor::ExecutionError;

/// Everything the probe saw while waiting for one expectation.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct PollRecord {
    pub polls: u32,
    /// Whether any poll found the element at all.
    pub ever_found: bool,
    pub holds: bool,
    pub last_state: Option<ElementState>,
    /// Last compared text/value, trimmed.
    pub last_observed: Option<String>,
    pub last_error: Option<String>,
}

impl PollRecord {
    pub fn last_present(&self) -> bool {
        self.last_state.as_ref().is_some_and(|s| s.present)
    }

    fn record(&mut self, state: ElementState, observation: Observation) {
        self.ever_found |= state.present;
        self.holds = observation.holds;
        if observation.observed.is_some() {
            self.last_observed = observation.observed;
        }
        self.last_state = Some(state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub holds: bool,
    pub observed: Option<String>,
}

/// An expectation with its pattern compiled once.
pub struct ExpectationCheck<'a> {
    expectation: &'a Expectation,
    pattern: Option<Regex>,
}

impl<'a> ExpectationCheck<'a> {
    pub fn new(expectation: &'a Expectation) -> Result<Self, regex::Error> {
        let pattern = match expectation {
            Expectation::ElementTextMatchesPattern { pattern, .. } => Some(Regex::new(pattern)?),
            _ => None,
        };
        Ok(Self {
            expectation,
            pattern,
        })
    }

    pub fn selector(&self) -> &str {
        self.expectation.selector()
    }

    pub fn evaluate(&self, state: &ElementState) -> Observation {
        match self.expectation {
            Expectation::ElementVisible { .. } => Observation {
                holds: state.present && state.visible,
                observed: None,
            },
            Expectation::ElementEnabled { .. } => Observation {
                holds: state.present && state.enabled,
                observed: None,
            },
            Expectation::ElementAbsent { .. } => Observation {
                holds: !state.present,
                observed: None,
            },
            Expectation::ElementTextEquals {
                expected, source, ..
            } => {
                let observed = observed_text(state, *source);
                let holds = state.present && observed.as_deref() == Some(expected.trim());
                Observation { holds, observed }
            }
            Expectation::ElementTextMatchesPattern { source, .. } => {
                let observed = observed_text(state, *source);
                let holds = state.present
                    && match (&self.pattern, observed.as_deref()) {
                        (Some(re), Some(text)) => re.is_match(text),
                        _ => false,
                    };
                Observation { holds, observed }
            }
        }
    }
}

fn observed_text(state: &ElementState, source: formwatch_core::TextSource) -> Option<String> {
    if !state.present {
        return None;
    }
    state.source(source).map(|s| s.trim().to_string())
}

/// Polls the live page until an expectation holds or its deadline passes.
pub struct DomProbe<'a> {
    page: &'a dyn Page,
    poll_interval: Duration,
}

impl<'a> DomProbe<'a> {
    pub fn new(page: &'a dyn Page, poll_interval: Duration) -> Self {
        Self {
            page,
            poll_interval,
        }
    }

    /// Always polls at least once. A closed session aborts the wait; other query errors count
    /// as polls that found nothing.
    pub async fn wait_for(
        &self,
        check: &ExpectationCheck<'_>,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<PollRecord, ExecutionError> {
        let deadline = Instant::now() + timeout;
        let selector = check.selector();
        let mut record = PollRecord::default();

        loop {
            record.polls += 1;
            let budget = deadline
                .saturating_duration_since(Instant::now())
                .max(self.poll_interval);

            let located = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ExecutionError::Cancelled),
                r = tokio::time::timeout(budget, self.page.locate(selector)) => r,
            };

            match located {
                Ok(Ok(state)) => {
                    let observation = check.evaluate(&state);
                    record.record(state, observation);
                    if record.holds {
                        return Ok(record);
                    }
                }
                Ok(Err(BrowserError::Closed)) => {
                    return Err(ExecutionError::Browser(BrowserError::Closed))
                }
                Ok(Err(e)) => {
                    tracing::debug!(selector, error = %e, "locate failed");
                    record.last_error = Some(e.to_string());
                }
                Err(_) => {
                    record.last_error = Some(format!("locate timed out after {budget:?}"));
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(record);
            }
            let wait = self.poll_interval.min(deadline - now);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ExecutionError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }
}
