//! Per-email orchestration: bind templates to an email, invoke the
//! model for each, and store the accumulated result set.

use serde_json::json;
use thiserror::Error;

use crate::ai::bridge::{self, Invocation};
use crate::ai::client::CompletionModel;
use crate::ai::prompts;
use crate::store::{ResultSet, Store};

/// Failures that abort a whole operation. Per-prompt trouble (missing
/// template, model misbehavior) never lands here; it is reported inline
/// in the result set instead.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("email not found: {0}")]
    EmailNotFound(String),
    #[error("prompt not found: {0}")]
    PromptNotFound(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Evaluate the named prompt templates against one email, strictly one
/// after another, and store the result set in a single keyed replace
/// once all of them have completed.
///
/// The returned mapping always has exactly one entry per requested name:
/// a structured value, one of the bridge's error shapes, or a
/// synthesized `{"error": "prompt not found"}` entry for names with no
/// stored template. Partial success across a batch is the normal case,
/// not an exception. Only an unknown email id aborts the operation.
pub async fn process_email<M: CompletionModel>(
    store: &Store,
    model: &M,
    email_id: &str,
    prompt_names: &[String],
) -> Result<ResultSet, ProcessError> {
    let email = store
        .get_email(email_id)
        .await?
        .ok_or_else(|| ProcessError::EmailNotFound(email_id.to_string()))?;

    let mut results = ResultSet::new();
    for name in prompt_names {
        let entry = match store.get_prompt(name).await? {
            Some(template) => {
                let prompt = prompts::assemble(&template, &email, None);
                tracing::debug!(prompt = name.as_str(), email = email_id, "invoking model");
                bridge::invoke(model, &prompt).await.into_value()
            }
            None => {
                tracing::warn!(prompt = name.as_str(), "requested template does not exist");
                json!({"error": "prompt not found"})
            }
        };
        results.insert(name.clone(), entry);
    }

    store.put_results(email_id, &results).await?;
    Ok(results)
}

/// Ad-hoc query mode: assemble the named template with an extra
/// USER_QUERY line and invoke once. The outcome goes back to the caller
/// without touching stored result sets; saving a reply is a separate
/// draft operation.
pub async fn ask<M: CompletionModel>(
    store: &Store,
    model: &M,
    email_id: &str,
    template_name: &str,
    question: &str,
) -> Result<Invocation, ProcessError> {
    let email = store
        .get_email(email_id)
        .await?
        .ok_or_else(|| ProcessError::EmailNotFound(email_id.to_string()))?;

    let template = store
        .get_prompt(template_name)
        .await?
        .ok_or_else(|| ProcessError::PromptNotFound(template_name.to_string()))?;

    let prompt = prompts::assemble(&template, &email, Some(question));
    Ok(bridge::invoke(model, &prompt).await)
}

/// Seed the built-in templates, inserting only names that are absent so
/// user edits survive repeated setup runs. Returns how many were added.
pub async fn seed_builtin_prompts(store: &Store) -> Result<usize, ProcessError> {
    let mut seeded = 0;
    for (name, content) in prompts::BUILTIN_PROMPTS {
        if store.get_prompt(name).await?.is_none() {
            store.upsert_prompt(name, content).await?;
            seeded += 1;
        }
    }
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::Email;
    use anyhow::Result;

    /// Stub model that always returns the same scripted text.
    struct Scripted(&'static str);

    impl CompletionModel for Scripted {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    /// Stub model whose every call fails at the transport level.
    struct Offline;

    impl CompletionModel for Offline {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            anyhow::bail!("dns lookup failed")
        }
    }

    async fn store_with_email() -> Store {
        let store = Store::open_in_memory().await.unwrap();
        store
            .insert_emails(&[Email {
                id: "e1".to_string(),
                from_addr: "alice@example.com".to_string(),
                to_addr: "me@example.com".to_string(),
                subject: "Budget review".to_string(),
                body: "Can you review the budget by Thursday?".to_string(),
                timestamp: "2026-04-02T10:00:00Z".to_string(),
            }])
            .await
            .unwrap();
        store
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn missing_template_yields_inline_error_entry() {
        let store = store_with_email().await;
        store.upsert_prompt("p1", "Categorize.").await.unwrap();

        let model = Scripted("{\"category\": \"work\"}");
        let results = process_email(&store, &model, "e1", &names(&["p1", "p2"]))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results["p1"], serde_json::json!({"category": "work"}));
        assert_eq!(results["p2"], serde_json::json!({"error": "prompt not found"}));
    }

    #[tokio::test]
    async fn call_failure_is_contained_per_prompt() {
        let store = store_with_email().await;
        store.upsert_prompt("p1", "Categorize.").await.unwrap();
        store.upsert_prompt("p2", "Extract tasks.").await.unwrap();

        let results = process_email(&store, &Offline, "e1", &names(&["p1", "p2"]))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        for entry in results.values() {
            assert_eq!(entry["error"], "LLM call failed");
            assert!(entry["details"].as_str().unwrap().contains("dns lookup failed"));
        }
    }

    #[tokio::test]
    async fn unknown_email_aborts() {
        let store = store_with_email().await;
        let err = process_email(&store, &Scripted("{}"), "ghost", &names(&["p1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::EmailNotFound(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn rerun_replaces_stored_result_set() {
        let store = store_with_email().await;
        store.upsert_prompt("p1", "Categorize.").await.unwrap();
        store.upsert_prompt("p2", "Extract tasks.").await.unwrap();

        let model = Scripted("[\"task a\"]");
        process_email(&store, &model, "e1", &names(&["p1", "p2"]))
            .await
            .unwrap();
        process_email(&store, &model, "e1", &names(&["p2"]))
            .await
            .unwrap();

        let stored = store.get_results("e1").await.unwrap().unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored.contains_key("p2"));
    }

    #[tokio::test]
    async fn prose_output_is_stored_as_typed_error() {
        let store = store_with_email().await;
        store.upsert_prompt("p1", "Categorize.").await.unwrap();

        let model = Scripted("Sorry, I cannot help with that.");
        let results = process_email(&store, &model, "e1", &names(&["p1"]))
            .await
            .unwrap();

        assert_eq!(results["p1"]["error"], "No JSON found in LLM output");
        assert_eq!(
            results["p1"]["raw_output"],
            "Sorry, I cannot help with that."
        );
    }

    #[tokio::test]
    async fn ask_appends_query_and_returns_outcome() {
        let store = store_with_email().await;
        store
            .upsert_prompt("summarize_prompt", "Summarize this email.")
            .await
            .unwrap();

        let model = Scripted("{\"summary\": \"Budget review due Thursday.\"}");
        let outcome = ask(&store, &model, "e1", "summarize_prompt", "Summarize it")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Invocation::Structured(serde_json::json!({"summary": "Budget review due Thursday."}))
        );

        // ask never writes result sets
        assert!(store.get_results("e1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ask_with_unknown_template_is_structural() {
        let store = store_with_email().await;
        let err = ask(&store, &Scripted("{}"), "e1", "nope", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::PromptNotFound(name) if name == "nope"));
    }

    #[tokio::test]
    async fn seeding_preserves_user_edits() {
        let store = Store::open_in_memory().await.unwrap();
        assert_eq!(seed_builtin_prompts(&store).await.unwrap(), 4);

        store
            .upsert_prompt("categorization_prompt", "my own version")
            .await
            .unwrap();
        assert_eq!(seed_builtin_prompts(&store).await.unwrap(), 0);
        assert_eq!(
            store.get_prompt("categorization_prompt").await.unwrap(),
            Some("my own version".to_string())
        );
    }
}
