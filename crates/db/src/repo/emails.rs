use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;

use super::kv;

/// Namespace holding opt-in addresses.
pub const NAMESPACE: &str = "references_emails";

/// Record an opt-in address with its submission time. Resubmitting the same
/// address overwrites the timestamp.
pub async fn record(
    pool: &SqlitePool,
    email: &str,
    submitted_at: DateTime<Utc>,
) -> Result<(), crate::DbError> {
    let ts = submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true);
    kv::put(pool, NAMESPACE, email, &ts).await?;
    Ok(())
}

/// Submission timestamp for an address, if it was ever recorded.
pub async fn submitted_at(pool: &SqlitePool, email: &str) -> Result<Option<String>, crate::DbError> {
    Ok(kv::get(pool, NAMESPACE, email).await?)
}
