//! SQLite persistence for prompts, emails, result sets, and drafts.
//!
//! This module is split into:
//! - `mod.rs` - Store struct, connection pool, open/delegation
//! - `schema.rs` - Database schema initialization
//! - `prompt.rs` - Prompt template operations
//! - `email.rs` - Email CRUD operations
//! - `result.rs` - Per-email result-set documents
//! - `draft.rs` - Saved reply drafts
//!
//! Four independent keyed stores; every write is a per-key atomic
//! replace (last write wins), and there are no cross-store transactions.

mod draft;
mod email;
mod prompt;
mod result;
mod schema;

pub use prompt::PromptTemplate;
pub use result::ResultSet;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::mail::{Draft, Email};

/// The CLI issues one operation at a time; a small pool still lets the
/// occasional concurrent reader through without blocking on writes.
const POOL_SIZE: u32 = 4;

pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn open(path: &Path) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", path.display());

        let options = SqliteConnectOptions::from_str(&db_url)?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(POOL_SIZE)
            .connect_with(options)
            .await
            .context("Failed to create connection pool")?;

        schema::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to create in-memory connection pool")?;

        schema::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    //
    // Prompt Template Operations (delegated to prompt module)
    //

    pub async fn upsert_prompt(&self, name: &str, content: &str) -> Result<()> {
        prompt::upsert_prompt(&self.pool, name, content).await
    }

    pub async fn list_prompts(&self) -> Result<Vec<PromptTemplate>> {
        prompt::list_prompts(&self.pool).await
    }

    pub async fn get_prompt(&self, name: &str) -> Result<Option<String>> {
        prompt::get_prompt(&self.pool, name).await
    }

    //
    // Email Operations (delegated to email module)
    //

    pub async fn insert_emails(&self, emails: &[Email]) -> Result<()> {
        email::insert_emails(&self.pool, emails).await
    }

    pub async fn list_emails(&self) -> Result<Vec<Email>> {
        email::list_emails(&self.pool).await
    }

    pub async fn get_email(&self, id: &str) -> Result<Option<Email>> {
        email::get_email(&self.pool, id).await
    }

    pub async fn email_count(&self) -> Result<usize> {
        email::email_count(&self.pool).await
    }

    //
    // Result Set Operations (delegated to result module)
    //

    pub async fn put_results(&self, email_id: &str, results: &ResultSet) -> Result<()> {
        result::put_results(&self.pool, email_id, results).await
    }

    pub async fn get_results(&self, email_id: &str) -> Result<Option<ResultSet>> {
        result::get_results(&self.pool, email_id).await
    }

    //
    // Draft Operations (delegated to draft module)
    //

    pub async fn put_draft(&self, draft: &Draft) -> Result<()> {
        draft::put_draft(&self.pool, draft).await
    }

    pub async fn get_draft(&self, id: &str) -> Result<Option<Draft>> {
        draft::get_draft(&self.pool, id).await
    }

    pub async fn list_drafts(&self) -> Result<Vec<Draft>> {
        draft::list_drafts(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_email(id: &str) -> Email {
        Email {
            id: id.to_string(),
            from_addr: "sender@example.com".to_string(),
            to_addr: "me@example.com".to_string(),
            subject: format!("Subject {id}"),
            body: "Body text".to_string(),
            timestamp: "2026-03-01T12:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_prompt_is_idempotent() {
        let store = Store::open_in_memory().await.unwrap();

        store.upsert_prompt("cat", "first version").await.unwrap();
        store.upsert_prompt("cat", "second version").await.unwrap();

        let prompts = store.list_prompts().await.unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].name, "cat");
        assert_eq!(prompts[0].content, "second version");
    }

    #[tokio::test]
    async fn empty_prompt_content_is_allowed() {
        let store = Store::open_in_memory().await.unwrap();

        store.upsert_prompt("blank", "").await.unwrap();
        assert_eq!(store.get_prompt("blank").await.unwrap(), Some(String::new()));
    }

    #[tokio::test]
    async fn missing_prompt_is_none_not_error() {
        let store = Store::open_in_memory().await.unwrap();
        assert_eq!(store.get_prompt("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn bulk_load_twice_is_idempotent() {
        let store = Store::open_in_memory().await.unwrap();
        let inbox = vec![sample_email("e1"), sample_email("e2"), sample_email("e3")];

        store.insert_emails(&inbox).await.unwrap();
        assert_eq!(store.email_count().await.unwrap(), 3);

        store.insert_emails(&inbox).await.unwrap();
        assert_eq!(store.email_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn reload_replaces_on_id() {
        let store = Store::open_in_memory().await.unwrap();

        store.insert_emails(&[sample_email("e1")]).await.unwrap();

        let mut updated = sample_email("e1");
        updated.subject = "Updated".to_string();
        store.insert_emails(&[updated]).await.unwrap();

        let stored = store.get_email("e1").await.unwrap().unwrap();
        assert_eq!(stored.subject, "Updated");
        assert_eq!(store.email_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn result_set_overwrite_discards_previous() {
        let store = Store::open_in_memory().await.unwrap();

        let mut first = ResultSet::new();
        first.insert("p1".to_string(), json!({"a": 1}));
        first.insert("p2".to_string(), json!({"b": 2}));
        store.put_results("e1", &first).await.unwrap();

        let mut second = ResultSet::new();
        second.insert("p3".to_string(), json!([1, 2]));
        store.put_results("e1", &second).await.unwrap();

        let stored = store.get_results("e1").await.unwrap().unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored.contains_key("p3"));
        assert!(!stored.contains_key("p1"));
    }

    #[tokio::test]
    async fn results_for_unprocessed_email_are_absent() {
        let store = Store::open_in_memory().await.unwrap();
        assert!(store.get_results("never").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn draft_round_trip_and_replace() {
        let store = Store::open_in_memory().await.unwrap();

        let draft = Draft::new("e1", "First attempt.".to_string());
        store.put_draft(&draft).await.unwrap();

        let replacement = Draft::new("e1", "Second attempt.".to_string());
        store.put_draft(&replacement).await.unwrap();

        let stored = store.get_draft("draft_e1").await.unwrap().unwrap();
        assert_eq!(stored.reply, "Second attempt.");
        assert_eq!(store.list_drafts().await.unwrap().len(), 1);
    }
}
