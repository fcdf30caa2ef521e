//! Handler for the `/recap` slash command.
//!
//! Replies immediately with an ephemeral placeholder, then finishes the
//! request asynchronously through the command's `response_url`.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::error;

use super::{AppState, parsing, require_valid_signature};
use crate::core::models::Trigger;

/// Immediate acknowledgement shown while the summary is being produced.
const ACK_TEXT: &str = "⏳ Résumé en cours…";

pub async fn handle_slash_command(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if let Err(resp) = require_valid_signature(&headers, &body, &state.config) {
        return resp;
    }

    let event = match parsing::parse_form_data(&body) {
        Ok(event) => event,
        Err(e) => {
            error!("Failed to parse slash command body: {}", e);
            return (StatusCode::BAD_REQUEST, format!("Parse Error: {e}")).into_response();
        }
    };

    // Empty text means "summarize the channel the command was typed in";
    // otherwise the text carries a channel id offered by autocomplete.
    let trigger = match parsing::extract_channel_id(&event.text) {
        Some(channel_id) => Trigger::SlashCommand {
            requester: event.user_id.clone(),
            channel_id,
        },
        None => Trigger::CurrentChannel {
            requester: event.user_id.clone(),
            channel_id: event.channel_id.clone(),
        },
    };

    let bot = state.bot.clone();
    let response_url = event.response_url.clone();
    tokio::spawn(async move {
        let reply = bot.handle_trigger(&trigger).await;
        if let Err(e) = bot
            .slack_client()
            .respond_via_url(&response_url, &reply.text)
            .await
        {
            error!("Failed to deliver slash command reply: {}", e);
        }
    });

    Json(ack_payload()).into_response()
}

fn ack_payload() -> Value {
    json!({
        "response_type": "ephemeral",
        "text": ACK_TEXT,
    })
}
