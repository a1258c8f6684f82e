//! Prompt template operations.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

/// A named prompt template. Upsert-only: templates are never deleted and
/// carry no version history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub name: String,
    pub content: String,
}

/// Insert or replace the template for `name`. Empty content is allowed.
pub async fn upsert_prompt(pool: &SqlitePool, name: &str, content: &str) -> Result<()> {
    sqlx::query("INSERT OR REPLACE INTO prompts (name, content) VALUES (?, ?)")
        .bind(name)
        .bind(content)
        .execute(pool)
        .await?;
    Ok(())
}

/// All templates; order is not significant to callers.
pub async fn list_prompts(pool: &SqlitePool) -> Result<Vec<PromptTemplate>> {
    let rows = sqlx::query("SELECT name, content FROM prompts ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| PromptTemplate {
            name: row.get("name"),
            content: row.get("content"),
        })
        .collect())
}

/// Template content by name. Not-found is `None`, never an error;
/// callers synthesize a per-prompt error entry instead of aborting a
/// whole batch.
pub async fn get_prompt(pool: &SqlitePool, name: &str) -> Result<Option<String>> {
    let row = sqlx::query("SELECT content FROM prompts WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.get("content")))
}
