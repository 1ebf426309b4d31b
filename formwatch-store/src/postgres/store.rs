use std::time::Duration;

use sqlx::PgPool;

use crate::store::{FingerprintStore, StoreError};

use super::fingerprints;

/// Fingerprint store shared between processes through the `alert_fingerprints` table.
pub struct PostgresFingerprintStore {
    pool: PgPool,
}

impl PostgresFingerprintStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Deletes expired rows. Expired rows never suppress anything, this only keeps the table small.
    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        fingerprints::purge_expired(&self.pool).await
    }
}

#[async_trait::async_trait]
impl FingerprintStore for PostgresFingerprintStore {
    async fn check_and_set(&self, fingerprint: &str, ttl: Duration) -> Result<bool, StoreError> {
        fingerprints::claim(&self.pool, fingerprint, ttl).await
    }

    async fn release(&self, fingerprint: &str) -> Result<(), StoreError> {
        fingerprints::release(&self.pool, fingerprint).await
    }
}
