//! LLM (`OpenAI`) API client module
//!
//! Encapsulates the chat-completion call that turns a built prompt into
//! summary text.

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{info, warn};

use super::Summarizer;
use crate::errors::BotError;

const DEFAULT_MODEL: &str = "gpt-4o";
const MAX_OUTPUT_TOKENS: u32 = 1000;
const TEMPERATURE: f64 = 0.5;

/// Explicit request deadline. The original had none and relied on the
/// transport default; a stuck completion must not pin a request forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// LLM API client for generating summaries
pub struct LlmClient {
    api_key: String,
    model_name: String,
}

impl LlmClient {
    #[must_use]
    pub fn new(api_key: String, model_name: Option<String>) -> Self {
        Self {
            api_key,
            model_name: model_name.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// The prompt is a single user-role message; sampling parameters are
    /// fixed.
    fn build_prompt_messages(prompt: &str) -> Vec<ChatCompletionMessage> {
        vec![ChatCompletionMessage {
            role: MessageRole::user,
            content: Content::Text(prompt.to_string()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }]
    }

    async fn request_completion(&self, prompt: &str) -> Result<String, BotError> {
        let messages = Self::build_prompt_messages(prompt);
        let request_body = build_chat_completions_body(&self.model_name, &messages);

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BotError::HttpError(format!("Failed to build OpenAI HTTP client: {e}")))?;

        let response = client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| BotError::SummarizationApi(format!("OpenAI API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(BotError::SummarizationApi(format!(
                "OpenAI API error (status {status}): {error_text}"
            )));
        }

        let response_json: Value = response.json().await.map_err(|e| {
            BotError::SummarizationApi(format!("Failed to parse OpenAI response: {e}"))
        })?;

        let first_choice = response_json
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .ok_or_else(|| BotError::SummarizationApi("No choices in response".to_string()))?;

        // finish_reason is observed for logging only; it never alters the
        // delivered text.
        match first_choice.get("finish_reason").and_then(Value::as_str) {
            Some("length") => {
                warn!("Summary cut off by the max_tokens ceiling (finish_reason=length)");
            }
            Some(reason) => info!(finish_reason = %reason, "Summary finished"),
            None => info!("No finish_reason provided by the API"),
        }

        let text = first_choice
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| BotError::SummarizationApi("No text in response".to_string()))?;

        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl Summarizer for LlmClient {
    async fn summarize(&self, prompt: &str) -> Result<String, BotError> {
        self.request_completion(prompt).await
    }
}

/// Chat Completions request payload from openai-api-rs chat messages.
fn build_chat_completions_body(model: &str, messages: &[ChatCompletionMessage]) -> Value {
    let message_values: Vec<Value> = messages
        .iter()
        .map(|m| {
            let role = match m.role {
                MessageRole::system => "system",
                MessageRole::assistant => "assistant",
                MessageRole::user | MessageRole::function | MessageRole::tool => "user",
            };
            let content = match &m.content {
                Content::Text(t) => t.clone(),
                Content::ImageUrl(_) => String::new(),
            };
            json!({ "role": role, "content": content })
        })
        .collect();

    json!({
        "model": model,
        "messages": message_values,
        "max_tokens": MAX_OUTPUT_TOKENS,
        "temperature": TEMPERATURE,
    })
}

/// Strip a dangling trailing bullet from a summary.
///
/// When generation stops mid-list the text ends with an ellipsis or a bare
/// bullet marker; in that case everything from the last bullet marker
/// onward is dropped so no incomplete bullet is shown.
#[must_use]
pub fn polish_summary(raw: &str) -> String {
    let trimmed = raw.trim();

    let dangling =
        trimmed.ends_with('…') || trimmed.ends_with("...") || trimmed.ends_with('•');

    if dangling {
        if let Some(idx) = trimmed.rfind('•') {
            return trimmed[..idx].trim_end().to_string();
        }
    }

    trimmed.to_string()
}
