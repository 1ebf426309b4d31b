use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use crate::http::{HttpClient, HttpRequestParts};
use crate::notify::{Notifier, NotifyError};
use crate::retry::parse_retry_after;

const SEND_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_RESPONSE_BYTES: usize = 64 * 1024;
const MAX_RETRY_AFTER: Duration = Duration::from_secs(10);
const ERROR_BODY_CHARS: usize = 200;

/// Posts `{"content": message}` to a chat webhook (Discord and compatibles).
///
/// The URL embeds the webhook token, so it is kept as a secret and never appears in errors.
/// A 429 is retried once after the advertised `Retry-After`, capped at ten seconds.
pub struct WebhookNotifier {
    url: SecretString,
    http: Arc<dyn HttpClient>,
}

impl WebhookNotifier {
    pub fn new(url: SecretString, http: Arc<dyn HttpClient>) -> Result<Self, NotifyError> {
        let parsed = url::Url::parse(url.expose_secret())
            .map_err(|e| NotifyError::InvalidEndpoint(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NotifyError::InvalidEndpoint(format!(
                "unsupported scheme `{}`",
                parsed.scheme()
            )));
        }
        Ok(Self { url, http })
    }

    fn request(&self, message: &str) -> Result<HttpRequestParts, NotifyError> {
        let url = url::Url::parse(self.url.expose_secret())
            .map_err(|e| NotifyError::InvalidEndpoint(e.to_string()))?;
        let body = serde_json::to_vec(&json!({ "content": message }))
            .map_err(|e| NotifyError::InvalidEndpoint(e.to_string()))?;
        Ok(HttpRequestParts {
            method: "POST".to_string(),
            url,
            headers: BTreeMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]),
            body,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let mut rate_limited_once = false;
        loop {
            let resp = self
                .http
                .send(self.request(message)?, SEND_TIMEOUT, MAX_RESPONSE_BYTES)
                .await?;

            if resp.is_success() {
                return Ok(());
            }

            if resp.status == 429 && !rate_limited_once {
                rate_limited_once = true;
                let wait = parse_retry_after(&resp.headers)
                    .unwrap_or(Duration::from_secs(1))
                    .min(MAX_RETRY_AFTER);
                tracing::warn!(wait_ms = wait.as_millis() as u64, "webhook rate limited, retrying once");
                tokio::time::sleep(wait).await;
                continue;
            }

            let body: String = String::from_utf8_lossy(&resp.body)
                .chars()
                .take(ERROR_BODY_CHARS)
                .collect();
            return Err(NotifyError::Status {
                status: resp.status,
                body,
            });
        }
    }
}
