use std::time::Duration;

use async_trait::async_trait;

/// Remembers which alert fingerprints were dispatched recently.
///
/// Shared by every monitoring run in a process (or across processes for the Postgres
/// implementation), so `check_and_set` must be a single atomic read-check-write.
#[async_trait]
pub trait FingerprintStore: Send + Sync {
    /// Claims `fingerprint` for `ttl`. Returns `true` when no live claim existed (the caller
    /// should alert) and `false` when the fingerprint is still inside its cooldown window.
    async fn check_and_set(&self, fingerprint: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Drops a claim, e.g. because the alert it guarded was never delivered.
    async fn release(&self, fingerprint: &str) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
    #[error("migration failed: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}
