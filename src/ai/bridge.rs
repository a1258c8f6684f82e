//! LLM invocation bridge: prompt string in, structured result out.
//!
//! Models routinely wrap JSON in commentary, emit trailing prose, or
//! return broken syntax. The bridge's whole job is making sure none of
//! that escapes as a fault: every outcome, including a failed provider
//! call, is captured as an [`Invocation`] so one bad call can never
//! abort the rest of a batch.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};

use super::client::CompletionModel;

/// Greedy span matcher: first `{` or `[` through the LAST `}` or `]` in
/// the text. Deliberately greedy so JSON wrapped in prose on both sides
/// still extracts; multiple JSON blocks or stray braces in prose defeat
/// it and surface as an `InvalidJson` failure instead. Known heuristic
/// limitation, kept on purpose.
static JSON_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}|\[.*\]").expect("valid literal pattern"));

/// Outcome of one model invocation. Success and failure are mutually
/// exclusive by construction; a failure always carries enough raw
/// context to debug what the model actually said.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// Parsed JSON value from the model output (object, array, or scalar).
    Structured(Value),
    Failed(InvocationFailure),
}

/// The distinct ways a model invocation can go wrong. Each variant maps
/// to its own stored error shape so "the model said nothing", "the model
/// didn't emit JSON", and "the model emitted broken JSON" stay tellable
/// apart after the fact.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationFailure {
    /// Transport or provider failure (timeout, auth, malformed response).
    CallFailed { details: String },
    /// The model returned an empty text payload.
    EmptyResponse,
    /// No `{...}` or `[...]` span anywhere in the output.
    NoJson { raw_output: String },
    /// A span was found but did not parse as JSON.
    InvalidJson { raw_extract: String, details: String },
}

impl Invocation {
    /// Convert to the JSON value that gets stored in a result set.
    pub fn into_value(self) -> Value {
        match self {
            Invocation::Structured(value) => value,
            Invocation::Failed(failure) => failure.into_value(),
        }
    }
}

impl InvocationFailure {
    pub fn into_value(self) -> Value {
        match self {
            InvocationFailure::CallFailed { details } => json!({
                "error": "LLM call failed",
                "details": details,
            }),
            InvocationFailure::EmptyResponse => json!({
                "error": "Empty LLM response",
            }),
            InvocationFailure::NoJson { raw_output } => json!({
                "error": "No JSON found in LLM output",
                "raw_output": raw_output,
            }),
            InvocationFailure::InvalidJson { raw_extract, details } => json!({
                "error": "Invalid JSON structure returned by LLM",
                "raw_extract": raw_extract,
                "details": details,
            }),
        }
    }
}

/// Invoke the model with an assembled prompt and extract a structured
/// result from its output. Infallible from the caller's point of view:
/// the return type has no error channel.
pub async fn invoke<M: CompletionModel>(model: &M, prompt: &str) -> Invocation {
    match model.complete(prompt).await {
        Ok(text) => extract_json(text.trim()),
        Err(e) => {
            tracing::warn!("model call failed: {:#}", e);
            Invocation::Failed(InvocationFailure::CallFailed {
                details: format!("{e:#}"),
            })
        }
    }
}

/// Pull the first JSON-looking span out of raw model text and parse it.
pub fn extract_json(text: &str) -> Invocation {
    if text.is_empty() {
        return Invocation::Failed(InvocationFailure::EmptyResponse);
    }

    let Some(span) = JSON_SPAN.find(text) else {
        return Invocation::Failed(InvocationFailure::NoJson {
            raw_output: text.to_string(),
        });
    };

    let extract = span.as_str().trim();
    match serde_json::from_str::<Value>(extract) {
        Ok(value) => Invocation::Structured(value),
        Err(e) => Invocation::Failed(InvocationFailure::InvalidJson {
            raw_extract: extract.to_string(),
            details: e.to_string(),
        }),
    }
}
