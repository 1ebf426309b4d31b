use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotPolicy {
    #[default]
    Never,
    Failure,
    Always,
}

impl ScreenshotPolicy {
    pub fn wants(&self, failed: bool) -> bool {
        match self {
            ScreenshotPolicy::Never => false,
            ScreenshotPolicy::Failure => failed,
            ScreenshotPolicy::Always => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScreenshotConfig {
    pub policy: ScreenshotPolicy,
    pub dir: PathBuf,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            policy: ScreenshotPolicy::Never,
            dir: PathBuf::from("screenshots"),
        }
    }
}

/// `<journey>_<step|final>_<YYYYmmdd_HHMMSS>_a<attempt>.png` under `dir`.
pub fn screenshot_path(
    dir: &Path,
    journey_id: &str,
    failed_step: Option<&str>,
    attempt: u32,
    at: DateTime<Utc>,
) -> PathBuf {
    let label = failed_step.unwrap_or("final");
    dir.join(format!(
        "{journey_id}_{label}_{}_a{attempt}.png",
        at.format("%Y%m%d_%H%M%S")
    ))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn file_name_uses_step_or_final_and_attempt() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 5, 7).unwrap();
        let dir = Path::new("/tmp/shots");
        assert_eq!(
            screenshot_path(dir, "checkout", Some("apply-coupon"), 1, at),
            PathBuf::from("/tmp/shots/checkout_apply-coupon_20260314_090507_a1.png")
        );
        assert_eq!(
            screenshot_path(dir, "checkout", None, 2, at),
            PathBuf::from("/tmp/shots/checkout_final_20260314_090507_a2.png")
        );
    }

    #[test]
    fn policy_selects_attempts() {
        assert!(!ScreenshotPolicy::Never.wants(true));
        assert!(ScreenshotPolicy::Failure.wants(true));
        assert!(!ScreenshotPolicy::Failure.wants(false));
        assert!(ScreenshotPolicy::Always.wants(false));
    }
}
