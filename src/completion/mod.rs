//! Completion gateway
//!
//! This module talks to external chat-completion providers:
//! - The [`CompletionProvider`] seam used by the trip planner
//! - An OpenAI-compatible HTTP client (Groq by default)
//! - The gateway error taxonomy

use async_trait::async_trait;

pub mod error;
pub mod groq;

pub use error::GatewayError;
pub use groq::GroqClient;

/// A chat-completion backend that turns a system instruction and a user
/// prompt into generated text.
///
/// One call maps to exactly one provider request. Implementations must not
/// retry or cache.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Label used in logs and relayed error messages
    fn name(&self) -> &str;

    /// Send the two-message exchange and return the first choice's content
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GatewayError>;
}
