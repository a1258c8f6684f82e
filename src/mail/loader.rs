//! Bulk inbox ingestion from an external JSON document.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::types::Email;

/// Read a mock inbox document: a JSON array of email records.
///
/// Parsing is strict about shape (every record needs id/from/to/subject/
/// body/timestamp) but nothing else; duplicate ids are allowed here and
/// resolved by the store's replace-on-id insert.
pub fn read_inbox(path: &Path) -> Result<Vec<Email>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read inbox file: {}", path.display()))?;

    let emails: Vec<Email> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse inbox file: {}", path.display()))?;

    Ok(emails)
}
