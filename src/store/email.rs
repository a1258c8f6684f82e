//! Email CRUD operations.

use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::mail::Email;

fn row_to_email(row: SqliteRow) -> Email {
    Email {
        id: row.get("id"),
        from_addr: row.get("from_addr"),
        to_addr: row.get("to_addr"),
        subject: row.get("subject"),
        body: row.get("body"),
        timestamp: row.get("timestamp"),
    }
}

/// Bulk-insert emails inside one transaction, replacing existing records
/// with matching ids. Loading the same inbox document twice leaves the
/// stored count unchanged.
pub async fn insert_emails(pool: &SqlitePool, emails: &[Email]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for email in emails {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO emails (id, from_addr, to_addr, subject, body, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&email.id)
        .bind(&email.from_addr)
        .bind(&email.to_addr)
        .bind(&email.subject)
        .bind(&email.body)
        .bind(&email.timestamp)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn list_emails(pool: &SqlitePool) -> Result<Vec<Email>> {
    let rows = sqlx::query(
        "SELECT id, from_addr, to_addr, subject, body, timestamp FROM emails ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_email).collect())
}

pub async fn get_email(pool: &SqlitePool, id: &str) -> Result<Option<Email>> {
    let row = sqlx::query(
        "SELECT id, from_addr, to_addr, subject, body, timestamp FROM emails WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_email))
}

pub async fn email_count(pool: &SqlitePool) -> Result<usize> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM emails")
        .fetch_one(pool)
        .await?;

    Ok(row.get::<i64, _>("count") as usize)
}
