//! Notification collaborator: delivers rendered alert text somewhere a human will see it.

mod webhook;

use async_trait::async_trait;

use crate::http::HttpError;

pub use webhook::WebhookNotifier;

#[derive(Debug, Clone, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Http(#[from] HttpError),
    #[error("notification endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid notification endpoint: {0}")]
    InvalidEndpoint(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

/// Dry-run notifier: prints the message instead of delivering it.
pub struct StdoutNotifier;

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        println!("{message}");
        Ok(())
    }
}
