//! Generation service boundary
//!
//! The language model is an opaque completion service reachable over HTTP.
//! Everything that talks to it goes through `GenerationClient`, so tests
//! and alternative backends plug in without touching the pipeline.
mod client;
pub mod prompts;

pub use client::HttpGenerationClient;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation service initialization failed: {0}")]
    InitializationError(String),

    #[error("Generation request failed: {0}")]
    RequestError(String),

    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),
}

/// One (human, ai) exchange of a chat session
///
/// Owned and ordered by the serving layer; the pipeline borrows it for a
/// single call and never retains or mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub human: String,
    pub ai: String,
}

impl ConversationTurn {
    pub fn new(human: impl Into<String>, ai: impl Into<String>) -> Self {
        Self {
            human: human.into(),
            ai: ai.into(),
        }
    }
}

/// Opaque text-completion service
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Complete a prompt, returning the generated text
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}
