use formwatch_core::TextSource;

/// What one DOM query saw.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ElementState {
    pub present: bool,
    pub visible: bool,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl ElementState {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn source(&self, source: TextSource) -> Option<&str> {
        match source {
            TextSource::Text => self.text.as_deref(),
            TextSource::Value => self.value.as_deref(),
            TextSource::Html => self.html.as_deref(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    Launch(String),
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },
    #[error("no element matches `{0}`")]
    ElementNotFound(String),
    #[error("element `{selector}` is not interactable: {message}")]
    NotInteractable { selector: String, message: String },
    #[error("browser protocol error: {0}")]
    Protocol(String),
    #[error("browser session is closed")]
    Closed,
}

impl BrowserError {
    pub fn not_interactable(selector: &str, message: impl Into<String>) -> Self {
        Self::NotInteractable {
            selector: selector.to_string(),
            message: message.into(),
        }
    }
}
