use crate::secrets::SecretRef;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// No provider knows this reference. Composite providers move on to the next one.
    #[error("secret {0} is not set")]
    NotFound(SecretRef),
    #[error("secret {0} is not valid UTF-8 and cannot be typed into a form")]
    NotUtf8(SecretRef),
    #[error("failed to read secret {secret_ref}: {message}")]
    Provider {
        secret_ref: SecretRef,
        message: String,
    },
}

impl SecretError {
    pub fn provider(secret_ref: SecretRef, message: impl Into<String>) -> Self {
        Self::Provider {
            secret_ref,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SecretError::NotFound(_))
    }
}
