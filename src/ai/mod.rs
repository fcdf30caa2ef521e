//! All AI/LLM functionality

pub mod client;

use async_trait::async_trait;

use crate::errors::BotError;

pub use client::{LlmClient, polish_summary};

/// Summarization seam: one prompt in, raw summary text out. Transport and
/// API failures surface as `BotError::SummarizationApi` and are converted
/// into a delivered error description at the dispatch boundary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, prompt: &str) -> Result<String, BotError>;
}
