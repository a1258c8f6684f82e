//! AI module: model client, invocation bridge, and prompt templates.
//!
//! The bridge turns free-form model output into structured results with
//! typed failure shapes; the client speaks the OpenRouter-style
//! chat-completions API behind the narrow [`CompletionModel`] seam.

pub mod bridge;
pub mod client;
pub mod prompts;

pub use bridge::{Invocation, InvocationFailure};
pub use client::{CompletionModel, OpenRouterClient};
