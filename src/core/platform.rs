//! Seam between the request pipeline and the chat platform, so the
//! pipeline runs (and is tested) without a live connection.

use async_trait::async_trait;

use crate::core::models::{ChannelMessage, ChannelRef};
use crate::errors::BotError;

/// History fetch limit: how many recent messages are considered per
/// request.
pub const HISTORY_FETCH_LIMIT: u16 = 40;

/// Read-only view of the chat platform used by the dispatch pipeline.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Channels visible to both the bot and the requester, across every
    /// community they share.
    async fn accessible_channels(&self, requester_id: &str) -> Result<Vec<ChannelRef>, BotError>;

    /// Up to `limit` most recent messages, newest-first. An
    /// insufficient-permission response from the platform must surface as
    /// `BotError::ChannelAccessForbidden`, distinct from other failures.
    async fn channel_history(
        &self,
        channel_id: &str,
        limit: u16,
    ) -> Result<Vec<ChannelMessage>, BotError>;
}
