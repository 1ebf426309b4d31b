use crate::types::Settings;
use crate::validate::validator::Validator;

pub(crate) fn validate_settings(v: &mut Validator, s: &Settings, path: &str) {
    v.validate_extensions(path, &s.extensions);

    let positive = [
        ("pollIntervalMs", s.poll_interval_ms),
        ("defaultTimeoutMs", s.default_timeout_ms),
        ("actionTimeoutMs", s.action_timeout_ms),
        ("navigationTimeoutMs", s.navigation_timeout_ms),
    ];
    for (name, value) in positive {
        if value == 0 {
            v.push(format!("{path}.{name}"), "must be greater than 0");
        }
    }

    if s.poll_interval_ms > s.default_timeout_ms {
        v.push(
            format!("{path}.pollIntervalMs"),
            "must not exceed defaultTimeoutMs",
        );
    }
}
