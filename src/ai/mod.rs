//! Ports for the AI assistance features.
//!
//! Handlers depend on these traits, never on a concrete model client, so
//! tests can substitute scripted implementations and the backing provider
//! can change without touching call sites. Failures are recoverable by
//! contract: callers fall back to static text or skip the enrichment.

pub mod openai;

use async_trait::async_trait;
use serde::Deserialize;

pub use openai::{OpenAiAnalysisAdapter, OpenAiPromptAdapter};

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("model request failed: {0}")]
    Backend(String),

    #[error("model returned no usable content")]
    EmptyResponse,

    #[error("model response was not in the expected shape: {0}")]
    Malformed(String),
}

/// Lightweight annotations derived from an entry body before it is sealed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntryAnalysis {
    pub summary: String,
    pub tone: String,
}

/// Produces a personalized reflection question from past entry titles.
/// Titles only; entry bodies are sealed and never leave the service.
#[async_trait]
pub trait ReflectionPromptService: Send + Sync {
    async fn prompt_from_titles(&self, titles: &[String]) -> Result<String, GenerationError>;
}

/// Summarizes an entry body and labels its emotional tone.
#[async_trait]
pub trait EntryAnalysisService: Send + Sync {
    async fn analyze(&self, content: &str) -> Result<EntryAnalysis, GenerationError>;
}
