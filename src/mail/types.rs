use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A single inbox email as loaded from the bulk JSON document.
///
/// Emails are immutable once loaded; re-loading a document replaces
/// records by id. All fields are plain strings, including `timestamp`
/// (the mock inbox format does not guarantee a parseable date).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    #[serde(rename = "from")]
    pub from_addr: String,
    #[serde(rename = "to")]
    pub to_addr: String,
    pub subject: String,
    pub body: String,
    pub timestamp: String,
}

/// A saved reply draft. Never sent anywhere; `id` is the only field the
/// store requires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub id: String,
    pub email_id: String,
    pub reply: String,
    pub saved_at: i64,
}

impl Draft {
    /// Create a draft for an email with the conventional `draft_<email_id>` id.
    pub fn new(email_id: &str, reply: String) -> Self {
        Self {
            id: format!("draft_{email_id}"),
            email_id: email_id.to_string(),
            reply,
            saved_at: Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_json_field_names() {
        let json = r#"{
            "id": "e1",
            "from": "alice@example.com",
            "to": "bob@example.com",
            "subject": "Hello",
            "body": "Hi Bob",
            "timestamp": "2026-01-05T09:00:00Z"
        }"#;
        let email: Email = serde_json::from_str(json).unwrap();
        assert_eq!(email.from_addr, "alice@example.com");
        assert_eq!(email.to_addr, "bob@example.com");

        // Round back out with the external field names intact
        let value = serde_json::to_value(&email).unwrap();
        assert_eq!(value["from"], "alice@example.com");
        assert!(value.get("from_addr").is_none());
    }

    #[test]
    fn draft_id_convention() {
        let draft = Draft::new("e42", "Thanks, will do.".to_string());
        assert_eq!(draft.id, "draft_e42");
        assert_eq!(draft.email_id, "e42");
    }
}
