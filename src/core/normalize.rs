//! Message Normalizer: raw history entries in, formatted lines out.

use crate::core::models::ChannelMessage;

/// Turn raw history entries (newest-first, as history APIs return them)
/// into human-readable lines ordered oldest-first, dropping messages from
/// automated senders.
///
/// Line format: `[YYYY-MM-DD HH:MM] author: content` (UTC).
///
/// Empty input yields an empty vec; the caller reports "nothing to
/// summarize" in that case.
#[must_use]
pub fn normalize_history(messages: &[ChannelMessage]) -> Vec<String> {
    messages
        .iter()
        .rev()
        .filter(|msg| !msg.is_automated)
        .map(format_line)
        .collect()
}

fn format_line(msg: &ChannelMessage) -> String {
    format!(
        "[{}] {}: {}",
        msg.timestamp.format("%Y-%m-%d %H:%M"),
        msg.author,
        msg.text
    )
}
