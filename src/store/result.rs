//! Result-set storage: one JSON document per email id.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use sqlx::{Row, SqlitePool};

/// Per-prompt invocation outcomes for one email, keyed by prompt name.
/// Every requested prompt has an entry, error shapes included.
pub type ResultSet = BTreeMap<String, Value>;

/// Store the result set for an email, replacing any previous set whole.
/// The replace is a single keyed write: there is no partial merge.
pub async fn put_results(pool: &SqlitePool, email_id: &str, results: &ResultSet) -> Result<()> {
    let json = serde_json::to_string(results).context("Failed to serialize result set")?;

    sqlx::query("INSERT OR REPLACE INTO results (email_id, json, created_at) VALUES (?, ?, ?)")
        .bind(email_id)
        .bind(json)
        .bind(Utc::now().timestamp())
        .execute(pool)
        .await?;

    Ok(())
}

/// Stored results for an email, or `None` if it has never been processed.
pub async fn get_results(pool: &SqlitePool, email_id: &str) -> Result<Option<ResultSet>> {
    let row = sqlx::query("SELECT json FROM results WHERE email_id = ?")
        .bind(email_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let json: String = row.get("json");
            let results =
                serde_json::from_str(&json).context("Failed to parse stored result set")?;
            Ok(Some(results))
        }
        None => Ok(None),
    }
}
