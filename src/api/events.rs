//! Handler for Slack Events API callbacks: the `url_verification`
//! handshake plus `message` events carrying the text trigger.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::error;

use super::{AppState, require_valid_signature};
use crate::core::models::Trigger;

/// Text trigger prefix for the DM / in-channel surface.
pub const TRIGGER_PREFIX: &str = "!recap";

/// Designator introducing a fuzzy channel query in a DM.
pub const CHANNEL_DESIGNATOR: char = '#';

const USAGE_HINT: &str = "Pour résumer un canal, écrivez `!recap #nom-du-canal`.";

/// What an inbound message event asks for.
#[derive(Debug, PartialEq, Eq)]
enum InboundText {
    /// DM: `!recap #fragment` → fuzzy channel lookup.
    Fuzzy(String),
    /// Shared channel: the prefix alone → summarize that channel.
    Current,
    /// DM that used the prefix without a usable query.
    UsageHint,
    /// Not a trigger at all.
    Ignore,
}

fn classify_message(channel_type: &str, text: &str) -> InboundText {
    let trimmed = text.trim();

    match channel_type {
        "im" => {
            let Some(rest) = trimmed.strip_prefix(TRIGGER_PREFIX) else {
                return InboundText::Ignore;
            };
            let rest = rest.trim();
            let Some(query) = rest.strip_prefix(CHANNEL_DESIGNATOR) else {
                return InboundText::UsageHint;
            };
            let query = query.trim();
            if query.is_empty() {
                InboundText::UsageHint
            } else {
                InboundText::Fuzzy(query.to_string())
            }
        }
        "channel" | "group" => {
            if trimmed == TRIGGER_PREFIX {
                InboundText::Current
            } else {
                InboundText::Ignore
            }
        }
        _ => InboundText::Ignore,
    }
}

pub async fn handle_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if let Err(resp) = require_valid_signature(&headers, &body, &state.config) {
        return resp;
    }

    let payload: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to parse event body: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
        }
    };

    match payload.get("type").and_then(Value::as_str) {
        Some("url_verification") => {
            let challenge = payload
                .get("challenge")
                .and_then(Value::as_str)
                .unwrap_or_default();
            Json(json!({ "challenge": challenge })).into_response()
        }
        Some("event_callback") => {
            if let Some(event) = payload.get("event") {
                process_message_event(&state, event);
            }
            StatusCode::OK.into_response()
        }
        _ => StatusCode::OK.into_response(),
    }
}

/// Kick off pipeline work for a message event. The HTTP response has
/// already been decided; Slack only needs the 200 within its deadline.
fn process_message_event(state: &AppState, event: &Value) {
    if event.get("type").and_then(Value::as_str) != Some("message") {
        return;
    }
    // Skip bot echoes and every message subtype (edits, joins, ...).
    if event.get("bot_id").is_some() || event.get("subtype").is_some() {
        return;
    }

    let Some(user) = event.get("user").and_then(Value::as_str) else {
        return;
    };
    let Some(origin_channel) = event.get("channel").and_then(Value::as_str) else {
        return;
    };
    let channel_type = event
        .get("channel_type")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let text = event.get("text").and_then(Value::as_str).unwrap_or_default();

    let inbound = classify_message(channel_type, text);

    let trigger = match inbound {
        InboundText::Ignore => return,
        InboundText::UsageHint => {
            deliver_async(state, origin_channel.to_string(), USAGE_HINT.to_string());
            return;
        }
        InboundText::Fuzzy(query) => Trigger::DirectMessage {
            requester: user.to_string(),
            query,
        },
        InboundText::Current => Trigger::CurrentChannel {
            requester: user.to_string(),
            channel_id: origin_channel.to_string(),
        },
    };

    let bot = state.bot.clone();
    let origin = origin_channel.to_string();
    tokio::spawn(async move {
        let reply = bot.handle_trigger(&trigger).await;
        if let Err(e) = bot.deliver_to_channel(&origin, &reply.text).await {
            error!("Failed to deliver event reply: {}", e);
        }
    });
}

fn deliver_async(state: &AppState, channel: String, text: String) {
    let bot = state.bot.clone();
    tokio::spawn(async move {
        if let Err(e) = bot.deliver_to_channel(&channel, &text).await {
            error!("Failed to deliver message: {}", e);
        }
    });
}
