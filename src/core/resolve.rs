//! Channel Resolver: direct id lookup for the slash-command path, fuzzy
//! substring matching against normalized names for the DM path.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::models::ChannelRef;

static NAME_CLEAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\-]").expect("static regex compile"));

/// Strip everything except letters, digits, dashes and underscores, then
/// lowercase. Idempotent: cleaning an already-clean name is a no-op.
#[must_use]
pub fn clean_channel_name(name: &str) -> String {
    NAME_CLEAN_RE.replace_all(name, "").to_lowercase()
}

/// Outcome of a fuzzy name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    None,
    One(ChannelRef),
    Many(Vec<ChannelRef>),
}

/// Direct mode: first channel whose identifier matches exactly.
#[must_use]
pub fn resolve_direct<'a>(channels: &'a [ChannelRef], channel_id: &str) -> Option<&'a ChannelRef> {
    channels.iter().find(|c| c.id == channel_id)
}

/// Fuzzy mode: the lowercased query must be a substring of the candidate's
/// cleaned display name. Candidates are scanned across every community the
/// directory covers.
#[must_use]
pub fn resolve_fuzzy(channels: &[ChannelRef], query: &str) -> Resolution {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Resolution::None;
    }

    let mut matches: Vec<ChannelRef> = channels
        .iter()
        .filter(|c| clean_channel_name(&c.name).contains(&needle))
        .cloned()
        .collect();

    if matches.len() > 1 {
        return Resolution::Many(matches);
    }
    match matches.pop() {
        Some(channel) => Resolution::One(channel),
        None => Resolution::None,
    }
}
