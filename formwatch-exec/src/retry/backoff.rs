use std::time::Duration;

use crate::retry::config::RetryConfig;

/// Pause before journey retry number `retry_no` (1-based).
///
/// Full jitter: uniform in `[0, min(max_delay, base * factor^(n-1))]`.
pub fn backoff_delay(cfg: &RetryConfig, retry_no: usize, rand_u64: impl FnOnce() -> u64) -> Duration {
    let exp = retry_no.saturating_sub(1).min(i32::MAX as usize) as i32;
    let ceiling = (cfg.base_delay.as_millis() as f64) * cfg.factor.powi(exp);
    let ceiling_ms = ceiling.min(cfg.max_delay.as_millis() as f64).max(0.0) as u64;

    if ceiling_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand_u64() % (ceiling_ms + 1))
}
