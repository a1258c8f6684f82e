//! Draft storage. Drafts are free-form JSON documents keyed by id; the
//! store validates nothing beyond the key.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

use crate::mail::Draft;

pub async fn put_draft(pool: &SqlitePool, draft: &Draft) -> Result<()> {
    let json = serde_json::to_string(draft).context("Failed to serialize draft")?;

    sqlx::query("INSERT OR REPLACE INTO drafts (id, json, saved_at) VALUES (?, ?, ?)")
        .bind(&draft.id)
        .bind(json)
        .bind(draft.saved_at)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn get_draft(pool: &SqlitePool, id: &str) -> Result<Option<Draft>> {
    let row = sqlx::query("SELECT json FROM drafts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let json: String = row.get("json");
            let draft = serde_json::from_str(&json).context("Failed to parse stored draft")?;
            Ok(Some(draft))
        }
        None => Ok(None),
    }
}

/// All drafts, most recently saved first.
pub async fn list_drafts(pool: &SqlitePool) -> Result<Vec<Draft>> {
    let rows = sqlx::query("SELECT json FROM drafts ORDER BY saved_at DESC")
        .fetch_all(pool)
        .await?;

    rows.into_iter()
        .map(|row| {
            let json: String = row.get("json");
            serde_json::from_str(&json).context("Failed to parse stored draft")
        })
        .collect()
}
