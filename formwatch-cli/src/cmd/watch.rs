use std::path::Path;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::cmd::config::build_monitor;
use crate::cmd::run::{cycle_exit_code, run_cycle, select_journeys, steps_per_journey};
use crate::exit_codes;
use crate::output::{print_error, print_report};
use crate::utils::load_document;
use crate::{
    BrowserArgs, MonitorArgs, OutputArgs, ScheduleArgs, SecretsArgs, StoreArgs, WebhookArgs,
};

/// Consecutive infrastructure errors retried without waiting before the normal interval applies.
const IMMEDIATE_RETRIES: u32 = 3;

/// Pause before the next cycle: the interval plus a uniform extra in the jitter range.
/// A reversed range is treated as its swap.
pub fn next_delay(schedule: &ScheduleArgs, rng: &mut fastrand::Rng) -> Duration {
    let (lo, hi) = if schedule.jitter_min_seconds <= schedule.jitter_max_seconds {
        (schedule.jitter_min_seconds, schedule.jitter_max_seconds)
    } else {
        (schedule.jitter_max_seconds, schedule.jitter_min_seconds)
    };
    let jitter = rng.u64(lo..=hi);
    Duration::from_secs(schedule.interval_seconds.saturating_add(jitter))
}

#[allow(clippy::too_many_arguments)]
pub async fn watch_cmd(
    path: &Path,
    schedule: ScheduleArgs,
    monitor: MonitorArgs,
    output: OutputArgs,
    store: StoreArgs,
    secrets: SecretsArgs,
    webhook: WebhookArgs,
    browser: BrowserArgs,
    cancel: &CancellationToken,
) -> i32 {
    let (doc, _) = match load_document(path) {
        Ok(v) => v,
        Err(e) => {
            print_error(output.format, output.quiet, &e.describe());
            return e.exit_code();
        }
    };
    let journeys = match select_journeys(&doc, monitor.journey.as_deref()) {
        Ok(j) => j,
        Err(msg) => {
            print_error(output.format, output.quiet, &msg);
            return exit_codes::INVALID_DOCUMENT;
        }
    };

    // Built once so the fingerprint store spans every cycle.
    let setup = match build_monitor(
        &doc.settings,
        &monitor,
        &store,
        &secrets,
        &webhook,
        &browser,
        steps_per_journey(&journeys),
    )
    .await
    {
        Ok(s) => s,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::INFRASTRUCTURE_ERROR;
        }
    };

    let mut rng = fastrand::Rng::new();
    let mut cycle: u64 = 0;
    let mut last_code = exit_codes::SUCCESS;
    let mut infra_streak: u32 = 0;

    while !cancel.is_cancelled() {
        cycle += 1;
        tracing::info!(cycle, journeys = journeys.len(), "watch cycle started");
        let reports = run_cycle(&setup, &journeys, cancel).await;
        for report in &reports {
            print_report(&output, report);
        }
        last_code = cycle_exit_code(&reports);

        if cancel.is_cancelled() {
            break;
        }
        if schedule.stop_on_alert && last_code == exit_codes::ALERTED {
            tracing::warn!(cycle, "deviation alerted; stopping");
            return exit_codes::ALERTED;
        }
        if schedule.max_cycles.is_some_and(|max| cycle >= max) {
            return last_code;
        }
        if last_code == exit_codes::INFRASTRUCTURE_ERROR {
            infra_streak += 1;
            if infra_streak <= IMMEDIATE_RETRIES {
                tracing::warn!(cycle, "infrastructure error; starting next cycle immediately");
                continue;
            }
            tracing::error!(cycle, streak = infra_streak, "repeated infrastructure errors");
        } else {
            infra_streak = 0;
        }

        let delay = next_delay(&schedule, &mut rng);
        tracing::info!(delay_secs = delay.as_secs(), "waiting for next cycle");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    tracing::info!(cycles = cycle, "watch stopped");
    last_code
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(interval: u64, min: u64, max: u64) -> ScheduleArgs {
        ScheduleArgs {
            interval_seconds: interval,
            jitter_min_seconds: min,
            jitter_max_seconds: max,
            stop_on_alert: false,
            max_cycles: None,
        }
    }

    #[test]
    fn delay_stays_within_jitter_range() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..100 {
            let d = next_delay(&schedule(60, 5, 10), &mut rng);
            assert!(d >= Duration::from_secs(65) && d <= Duration::from_secs(70));
        }
    }

    #[test]
    fn reversed_or_empty_jitter_is_tolerated() {
        let mut rng = fastrand::Rng::with_seed(7);
        assert_eq!(next_delay(&schedule(30, 0, 0), &mut rng), Duration::from_secs(30));
        let d = next_delay(&schedule(30, 4, 2), &mut rng);
        assert!(d >= Duration::from_secs(32) && d <= Duration::from_secs(34));
    }
}
