use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse journey document as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse journey document as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
#[error("journey document failed validation ({count} violations)")]
pub struct ValidationError {
    pub violations: Vec<Violation>,
    count: usize,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        let count = violations.len();
        Self { violations, count }
    }
}

/// One rule violation, located with a JSON-path-like string (`$.journeys[0].steps[2].action`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
