use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{FingerprintStore, StoreError};

/// Process-wide fingerprint map. Claims expire lazily; expired entries are pruned on write.
#[derive(Debug, Default)]
pub struct MemoryFingerprintStore {
    entries: Mutex<HashMap<String, Instant>>,
}

impl MemoryFingerprintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of claims that have not yet expired.
    pub async fn live_count(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|expires_at| **expires_at > now)
            .count()
    }
}

#[async_trait]
impl FingerprintStore for MemoryFingerprintStore {
    async fn check_and_set(&self, fingerprint: &str, ttl: Duration) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, expires_at| *expires_at > now);

        if entries.contains_key(fingerprint) {
            return Ok(false);
        }
        entries.insert(fingerprint.to_string(), now + ttl);
        Ok(true)
    }

    async fn release(&self, fingerprint: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(fingerprint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn claim_expires_after_ttl() {
        let store = MemoryFingerprintStore::new();
        let ttl = Duration::from_secs(60);

        assert!(store.check_and_set("fp", ttl).await.unwrap());
        assert!(!store.check_and_set("fp", ttl).await.unwrap());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(store.live_count().await, 0);
        assert!(store.check_and_set("fp", ttl).await.unwrap());
    }

    #[tokio::test]
    async fn release_frees_the_fingerprint() {
        let store = MemoryFingerprintStore::new();
        let ttl = Duration::from_secs(3600);

        assert!(store.check_and_set("fp", ttl).await.unwrap());
        store.release("fp").await.unwrap();
        assert!(store.check_and_set("fp", ttl).await.unwrap());
    }
}
