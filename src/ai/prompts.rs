//! Built-in prompt templates and prompt assembly.

use crate::mail::Email;

/// Default template for email categorization.
pub const CATEGORIZATION_PROMPT: &str = r#"You are an email triage assistant. Categorize the email below into exactly one of: work, personal, newsletter, notification, spam, other. Respond with a single JSON object of the form {"category": "<category>", "confidence": <0.0-1.0>, "reason": "<one short sentence>"}. Output only the JSON object, no commentary."#;

/// Default template for action-item extraction.
pub const ACTION_ITEM_PROMPT: &str = r#"You are an email triage assistant. Extract every concrete action item the recipient is expected to do from the email below. Respond with a JSON array of objects of the form {"task": "<what to do>", "due": "<deadline or null>", "requested_by": "<who asked>"}. If there are no action items, respond with an empty JSON array []. Output only JSON."#;

/// Default template for drafting a reply.
pub const AUTO_REPLY_PROMPT: &str = r#"You are an email assistant. Draft a brief, polite reply to the email below on behalf of the recipient. Respond with a single JSON object of the form {"reply": "<the reply text>"}. Output only the JSON object."#;

/// Default template for summarization.
pub const SUMMARIZE_PROMPT: &str = r#"You are an email summarization assistant. Summarize the email below in 1-3 sentences, capturing the key points and any action items. Respond with a single JSON object of the form {"summary": "<the summary>"}. Output only the JSON object."#;

/// Built-in templates seeded by `mailsift setup`, keyed by the names the
/// CLI and the ad-hoc heuristic refer to.
pub const BUILTIN_PROMPTS: &[(&str, &str)] = &[
    ("categorization_prompt", CATEGORIZATION_PROMPT),
    ("action_item_prompt", ACTION_ITEM_PROMPT),
    ("auto_reply_prompt", AUTO_REPLY_PROMPT),
    ("summarize_prompt", SUMMARIZE_PROMPT),
];

/// Assemble the full prompt for one (template, email) pair.
///
/// Pure concatenation: the template text, a blank line, then a literal
/// header block with the email's subject, sender, and body in that
/// order. Ad-hoc mode appends a USER_QUERY line. No escaping and no
/// truncation; whatever is in the body passes through verbatim, even if
/// it resembles the template's own structure.
pub fn assemble(template: &str, email: &Email, user_query: Option<&str>) -> String {
    let mut prompt = format!(
        "{template}\n\nEMAIL:\nSubject: {}\nFrom: {}\nBody:\n{}",
        email.subject, email.from_addr, email.body
    );
    if let Some(query) = user_query {
        prompt.push_str(&format!("\n\nUSER_QUERY: {query}"));
    }
    prompt
}

/// Pick a built-in template name for a free-form question, mirroring the
/// sidebar heuristics of the original demo UI: task-ish questions get
/// the action-item template, "summarize"-ish ones the summarizer,
/// everything else the reply drafter.
pub fn template_for_query(query: &str) -> &'static str {
    let lower = query.to_lowercase();
    if lower.contains("task") || lower.contains("what do i need") {
        "action_item_prompt"
    } else if lower.contains("summar") {
        "summarize_prompt"
    } else {
        "auto_reply_prompt"
    }
}
