use slack_morphism::errors::SlackClientError;
use thiserror::Error;

/// Request-scoped failure taxonomy. Every variant is mapped to a fixed
/// user-facing French string at the dispatch boundary; nothing propagates
/// past it.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("channel not found")]
    ChannelNotFound,

    #[error("channel name is ambiguous: {0:?}")]
    ChannelAmbiguous(Vec<String>),

    #[error("access to channel denied")]
    ChannelAccessForbidden,

    #[error("no messages available to summarize")]
    NoMessagesAvailable,

    #[error("summarization API error: {0}")]
    SummarizationApi(String),

    #[error("failed to parse payload: {0}")]
    ParseError(String),

    #[error("failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("failed to access platform API: {0}")]
    ApiError(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl From<SlackClientError> for BotError {
    fn from(error: SlackClientError) -> Self {
        BotError::ApiError(error.to_string())
    }
}

impl From<reqwest::Error> for BotError {
    fn from(error: reqwest::Error) -> Self {
        BotError::HttpError(error.to_string())
    }
}
