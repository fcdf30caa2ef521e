use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of one historical chat message, as returned by the
/// platform history fetch (newest-first). Request-scoped, never persisted.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub is_automated: bool,
    pub text: String,
}

/// Read-only view of a platform channel. `team_id` is the parent
/// community (Slack workspace) the channel belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    pub id: String,
    pub name: String,
    pub team_id: String,
}

/// Transient bundle handed from the history fetch to the summarization
/// stages; exists only for the duration of one request.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    /// Raw history entries, newest-first as fetched; the normalizer
    /// reorders them oldest-first before the prompt join.
    pub messages: Vec<ChannelMessage>,
    pub channel_name: Option<String>,
}

/// Final summarization output: the text to deliver plus whether the prompt
/// had to drop its oldest content to fit the character ceiling.
#[derive(Debug, Clone)]
pub struct SummaryResult {
    pub text: String,
    pub truncated: bool,
}

/// An inbound event that starts one summarization request.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Slash command carrying a channel id previously offered by the
    /// autocomplete surface.
    SlashCommand { requester: String, channel_id: String },
    /// DM text command: free text after the trigger prefix and the `#`
    /// designator, resolved fuzzily against channel names.
    DirectMessage { requester: String, query: String },
    /// Trigger prefix alone inside a shared channel: summarize that channel.
    CurrentChannel { requester: String, channel_id: String },
}

impl Trigger {
    pub fn requester(&self) -> &str {
        match self {
            Trigger::SlashCommand { requester, .. }
            | Trigger::DirectMessage { requester, .. }
            | Trigger::CurrentChannel { requester, .. } => requester,
        }
    }
}

/// Terminal state of one request's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Summarized,
    ChannelNotFound,
    ChannelAmbiguous,
    ChannelForbidden,
    NothingToSummarize,
    ApiError,
    Failed,
}

impl RequestOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestOutcome::Summarized => "summarized",
            RequestOutcome::ChannelNotFound => "channel_not_found",
            RequestOutcome::ChannelAmbiguous => "channel_ambiguous",
            RequestOutcome::ChannelForbidden => "channel_forbidden",
            RequestOutcome::NothingToSummarize => "nothing_to_summarize",
            RequestOutcome::ApiError => "api_error",
            RequestOutcome::Failed => "failed",
        }
    }

    /// True for the single fully successful terminal state.
    pub fn is_success(self) -> bool {
        matches!(self, RequestOutcome::Summarized)
    }
}

/// The one persisted row: an append-only usage record written when a
/// request reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub correlation_id: String,
    pub requester: String,
    pub channel_id: Option<String>,
    pub channel_name: Option<String>,
    pub outcome: String,
    pub at: DateTime<Utc>,
}
