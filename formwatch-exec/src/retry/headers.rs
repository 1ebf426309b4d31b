use std::collections::BTreeMap;
use std::time::Duration;

/// Reads a delta-seconds `Retry-After` header (the form chat webhooks use when rate limiting).
/// Fractional seconds are accepted.
pub fn parse_retry_after(headers: &BTreeMap<String, String>) -> Option<Duration> {
    let value = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("retry-after"))
        .map(|(_, v)| v.trim())?;

    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s >= 0.0)
        .map(Duration::from_secs_f64)
}
