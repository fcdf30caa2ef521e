//! Block-suggestion handler: channel autocomplete for the command surface.
//!
//! Given the requester's typed fragment, offers up to 25 candidates
//! labeled `#name (workspace)` whose value is the channel id.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::error;

use super::{AppState, parsing, require_valid_signature};
use crate::core::models::ChannelRef;
use crate::core::platform::ChatPlatform;

/// Slack caps select-menu option lists at 25 entries.
const MAX_OPTIONS: usize = 25;

pub async fn handle_block_suggestion(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if let Err(resp) = require_valid_signature(&headers, &body, &state.config) {
        return resp;
    }

    let payload = match parsing::parse_interactive_payload(&body) {
        Ok(v) => v,
        Err(e) => {
            error!("Interactive payload parse error: {}", e);
            return (StatusCode::BAD_REQUEST, format!("Parse Error: {e}")).into_response();
        }
    };

    if payload.get("type").and_then(Value::as_str) != Some("block_suggestion") {
        return Json(json!({ "options": [] })).into_response();
    }

    let typed = payload
        .get("value")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let requester = payload
        .get("user")
        .and_then(|u| u.get("id"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let channels = match state
        .bot
        .slack_client()
        .accessible_channels(requester)
        .await
    {
        Ok(channels) => channels,
        Err(e) => {
            error!("Failed to list channels for autocomplete: {}", e);
            Vec::new()
        }
    };

    let team_name = state
        .bot
        .slack_client()
        .bot_identity()
        .await
        .map(|id| id.team_name)
        .unwrap_or_default();

    Json(json!({ "options": build_options(&channels, typed, &team_name) })).into_response()
}

fn build_options(channels: &[ChannelRef], typed: &str, team_name: &str) -> Vec<Value> {
    let needle = typed.to_lowercase();

    channels
        .iter()
        .filter(|c| needle.is_empty() || c.name.to_lowercase().contains(&needle))
        .take(MAX_OPTIONS)
        .map(|c| {
            let label = if team_name.is_empty() {
                format!("#{}", c.name)
            } else {
                format!("#{} ({})", c.name, team_name)
            };
            json!({
                "text": { "type": "plain_text", "text": label },
                "value": c.id,
            })
        })
        .collect()
}
