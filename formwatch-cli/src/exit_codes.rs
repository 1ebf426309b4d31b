/// Exit codes for cron/CI callers.
pub const SUCCESS: i32 = 0;
pub const ALERTED: i32 = 1;
pub const INFRASTRUCTURE_ERROR: i32 = 2;
/// The journey document did not parse or validate; no run was started.
pub const INVALID_DOCUMENT: i32 = 3;

/// Combines per-journey exit codes: infrastructure error beats alert beats success.
pub fn worst(a: i32, b: i32) -> i32 {
    a.max(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worst_prefers_infrastructure_errors() {
        assert_eq!(worst(SUCCESS, ALERTED), ALERTED);
        assert_eq!(worst(INFRASTRUCTURE_ERROR, ALERTED), INFRASTRUCTURE_ERROR);
        assert_eq!(worst(SUCCESS, SUCCESS), SUCCESS);
    }
}
