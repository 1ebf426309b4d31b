use std::path::Path;

use formwatch_core::{
    parse_document_str, validate_document, DocumentFormat, MonitorDocument, ParseError,
    ValidationError,
};

use crate::exit_codes;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl LoadError {
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::Read { .. } => exit_codes::INFRASTRUCTURE_ERROR,
            LoadError::Parse(_) | LoadError::Invalid(_) => exit_codes::INVALID_DOCUMENT,
        }
    }

    /// Error text plus one line per validation violation.
    pub fn describe(&self) -> String {
        match self {
            LoadError::Invalid(err) => {
                let mut out = err.to_string();
                for v in &err.violations {
                    out.push_str(&format!("\n- {v}"));
                }
                out
            }
            other => other.to_string(),
        }
    }
}

/// Reads, parses and validates a journey document.
pub fn load_document(path: &Path) -> Result<(MonitorDocument, DocumentFormat), LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let parsed = parse_document_str(&content, DocumentFormat::Auto)?;
    validate_document(&parsed.document)?;
    Ok((parsed.document, parsed.format))
}

pub fn redact_url_password(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some("***")).is_ok() {
                parsed.to_string()
            } else {
                url.to_string()
            }
        }
        _ => url.to_string(),
    }
}
