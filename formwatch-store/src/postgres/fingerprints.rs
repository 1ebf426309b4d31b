use std::time::Duration;

use sqlx::PgPool;

use crate::store::StoreError;

/// Inserts the fingerprint, or takes over a row whose claim has already expired.
/// A conflicting live row makes the `WHERE` reject the update, so nothing is returned.
pub async fn claim(pool: &PgPool, fingerprint: &str, ttl: Duration) -> Result<bool, StoreError> {
    let row: Option<(String,)> = sqlx::query_as(
        r#"
INSERT INTO alert_fingerprints (fingerprint, claimed_at, expires_at)
VALUES ($1, now(), now() + make_interval(secs => $2))
ON CONFLICT (fingerprint) DO UPDATE
  SET claimed_at = EXCLUDED.claimed_at,
      expires_at = EXCLUDED.expires_at
  WHERE alert_fingerprints.expires_at <= now()
RETURNING fingerprint
        "#,
    )
    .bind(fingerprint)
    .bind(ttl.as_secs_f64())
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

pub async fn release(pool: &PgPool, fingerprint: &str) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM alert_fingerprints WHERE fingerprint = $1")
        .bind(fingerprint)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn purge_expired(pool: &PgPool) -> Result<u64, StoreError> {
    let result = sqlx::query("DELETE FROM alert_fingerprints WHERE expires_at <= now()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
