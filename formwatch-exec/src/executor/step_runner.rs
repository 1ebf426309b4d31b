use formwatch_core::{Action, StepDefinition};
use tokio_util::sync::CancellationToken;

use crate::browser::{BrowserError, Page};
use crate::classify::FailureSignal;
use crate::executor::probe::{DomProbe, ExpectationCheck, PollRecord};
use crate::executor::{ExecutionError, ExecutorConfig, ResolvedValues};

pub(crate) enum StepRun {
    Passed { observed: Option<String> },
    Failed(FailureSignal),
}

pub(crate) async fn run_step(
    page: &dyn Page,
    step: &StepDefinition,
    values: &ResolvedValues,
    config: &ExecutorConfig,
    cancel: &CancellationToken,
) -> Result<StepRun, ExecutionError> {
    let check = ExpectationCheck::new(&step.expectation).map_err(|e| {
        ExecutionError::InvalidPattern {
            step_id: step.step_id.clone(),
            message: e.to_string(),
        }
    })?;

    let acted = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ExecutionError::Cancelled),
        r = tokio::time::timeout(config.action_timeout, perform(page, step, values)) => r,
    };

    match acted {
        Err(_) => {
            tracing::debug!(
                step_id = %step.step_id,
                timeout = ?config.action_timeout,
                "action timed out"
            );
            return Ok(StepRun::Failed(FailureSignal::ExpectationUnmet(
                PollRecord::default(),
            )));
        }
        Ok(Err(ActionFailure::Execution(e))) => return Err(e),
        Ok(Err(ActionFailure::Browser(BrowserError::Closed))) => {
            return Err(ExecutionError::Browser(BrowserError::Closed))
        }
        Ok(Err(ActionFailure::Browser(e))) => {
            return Ok(StepRun::Failed(FailureSignal::ActionError {
                message: values.redact(&e.to_string()),
            }));
        }
        Ok(Ok(())) => {}
    }

    let probe = DomProbe::new(page, config.poll_interval);
    let record = probe
        .wait_for(&check, config.step_timeout(step), cancel)
        .await?;

    if record.holds {
        Ok(StepRun::Passed {
            observed: record.last_observed,
        })
    } else {
        Ok(StepRun::Failed(FailureSignal::ExpectationUnmet(record)))
    }
}

enum ActionFailure {
    Browser(BrowserError),
    Execution(ExecutionError),
}

async fn perform(
    page: &dyn Page,
    step: &StepDefinition,
    values: &ResolvedValues,
) -> Result<(), ActionFailure> {
    let value = || {
        values
            .get(&step.step_id)
            .map(|v| v.expose())
            .ok_or_else(|| ActionFailure::Execution(ExecutionError::MissingValue(step.step_id.clone())))
    };

    match &step.action {
        Action::FillField { selector, .. } => page
            .fill(selector, value()?)
            .await
            .map_err(ActionFailure::Browser),
        Action::SelectOption { selector, .. } => page
            .select_option(selector, value()?)
            .await
            .map_err(ActionFailure::Browser),
        Action::Click { selector } => page.click(selector).await.map_err(ActionFailure::Browser),
        Action::WaitOnly => Ok(()),
    }
}
