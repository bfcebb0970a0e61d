//! Namespaced key-value store. Writes overwrite by key; there is no
//! versioning or uniqueness check beyond the primary key.

use sqlx::SqlitePool;

/// Write `value` under `key`, replacing any previous value.
pub async fn put(
    pool: &SqlitePool,
    namespace: &str,
    key: &str,
    value: &str,
) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now().timestamp();
    sqlx::query(
        "INSERT INTO kv_entry (namespace, key, value, updated_ts) VALUES (?, ?, ?, ?) \
         ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value, updated_ts = excluded.updated_ts",
    )
    .bind(namespace)
    .bind(key)
    .bind(value)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get(
    pool: &SqlitePool,
    namespace: &str,
    key: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT value FROM kv_entry WHERE namespace = ? AND key = ?")
            .bind(namespace)
            .bind(key)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(v,)| v))
}

/// Number of keys in a namespace.
pub async fn count(pool: &SqlitePool, namespace: &str) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kv_entry WHERE namespace = ?")
        .bind(namespace)
        .fetch_one(pool)
        .await?;
    Ok(n)
}
