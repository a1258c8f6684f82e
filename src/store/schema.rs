//! Database schema initialization.

use anyhow::Result;
use sqlx::SqlitePool;

/// Create all tables. Four independent keyed stores, no joins or
/// transactions across them; every write is a keyed replace.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        -- Prompt templates, keyed by unique name
        CREATE TABLE IF NOT EXISTS prompts (
            name TEXT PRIMARY KEY,
            content TEXT NOT NULL DEFAULT ''
        );

        -- Inbox emails, keyed by id
        CREATE TABLE IF NOT EXISTS emails (
            id TEXT PRIMARY KEY,
            from_addr TEXT NOT NULL DEFAULT '',
            to_addr TEXT NOT NULL DEFAULT '',
            subject TEXT NOT NULL DEFAULT '',
            body TEXT NOT NULL DEFAULT '',
            timestamp TEXT NOT NULL DEFAULT ''
        );

        -- One result-set JSON document per email; a new run replaces it whole
        CREATE TABLE IF NOT EXISTS results (
            email_id TEXT PRIMARY KEY,
            json TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        -- Saved reply drafts, stored as JSON documents
        CREATE TABLE IF NOT EXISTS drafts (
            id TEXT PRIMARY KEY,
            json TEXT NOT NULL,
            saved_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_drafts_saved ON drafts(saved_at DESC);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
