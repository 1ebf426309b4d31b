use sqlx::PgPool;

use crate::store::StoreError;

/// Creates or upgrades the `alert_fingerprints` table. Applied migrations are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("postgres/migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Migration(e.to_string()))
}
