use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ValidationError, Violation};
use crate::types::{Extensions, MonitorDocument};

use super::rules;

pub(crate) static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-]+$").expect("valid"));

pub struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.violations))
        }
    }

    pub fn validate_document(&mut self, doc: &MonitorDocument) {
        rules::document::validate_document(self, doc);
    }

    pub(crate) fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(path, message));
    }

    pub(crate) fn validate_format_version(&mut self, path: &str, version: &str) {
        // Patch releases share a feature set; only major.minor is checked.
        let parts: Vec<&str> = version.split('.').collect();
        if parts.len() < 2 {
            self.push(path, "must be a semver-like string (major.minor[.patch])");
            return;
        }
        if parts[0] != "1" || parts[1] != "0" {
            self.push(path, "only formwatch document format 1.0.x is supported");
        }
    }

    pub(crate) fn validate_extensions(&mut self, path: &str, ext: &Extensions) {
        for key in ext.keys() {
            if !key.starts_with("x-") {
                self.push(
                    format!("{path}.{key}"),
                    "unknown field (only x-* extensions are allowed)",
                );
            }
        }
    }

    pub(crate) fn validate_id(&mut self, path: &str, id: &str) {
        if !ID_RE.is_match(id) {
            self.push(path, "must match regex [A-Za-z0-9_\\-]+");
        }
    }
}
