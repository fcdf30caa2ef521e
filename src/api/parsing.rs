//! Form and payload parsing for Slack's inbound surfaces.

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::errors::BotError;

/// Fields of a slash command invocation we care about.
#[derive(Debug, Deserialize, Serialize)]
pub struct SlackCommandEvent {
    pub team_id: String,
    pub channel_id: String,
    pub channel_name: String,
    pub user_id: String,
    pub user_name: String,
    pub command: String,
    pub text: String,
    pub response_url: String,
    pub trigger_id: String,
}

/// Decode one URL-encoded form component (`+` means space).
///
/// # Errors
///
/// Returns an error when the component is not valid UTF-8 after decoding.
pub fn decode_url_component(input: &str) -> Result<String, String> {
    percent_decode_str(input)
        .decode_utf8()
        .map(|s| s.replace('+', " "))
        .map_err(|e| format!("Failed to decode URL component: {}", e))
}

/// Parse the form-encoded body of a slash command request.
///
/// # Errors
///
/// Returns an error if any key or value fails to decode.
pub fn parse_form_data(form_data: &str) -> Result<SlackCommandEvent, BotError> {
    let mut map: HashMap<String, String> = HashMap::new();

    for pair in form_data.split('&') {
        if let Some(idx) = pair.find('=') {
            let key = decode_url_component(&pair[..idx])
                .map_err(|e| BotError::ParseError(format!("Failed to decode key: {}", e)))?;
            let value = decode_url_component(&pair[idx + 1..])
                .map_err(|e| BotError::ParseError(format!("Failed to decode value: {}", e)))?;
            map.insert(key, value);
        }
    }

    let field = |name: &str| map.get(name).cloned().unwrap_or_default();

    Ok(SlackCommandEvent {
        team_id: field("team_id"),
        channel_id: field("channel_id"),
        channel_name: field("channel_name"),
        user_id: field("user_id"),
        user_name: field("user_name"),
        command: field("command"),
        text: field("text"),
        response_url: field("response_url"),
        trigger_id: field("trigger_id"),
    })
}

/// Extract the target channel id from slash command text: either a
/// `<#C123ABC|name>` mention or a bare token (the block-suggestion value).
#[must_use]
pub fn extract_channel_id(text: &str) -> Option<String> {
    let token = text.split_whitespace().next()?;

    if token.starts_with("<#") && token.ends_with('>') {
        let inner = &token[2..token.len() - 1];
        let id = inner.split('|').next().unwrap_or(inner);
        if id.is_empty() {
            return None;
        }
        return Some(id.to_string());
    }

    Some(token.to_string())
}

/// Decode the `payload=` field of an interactive (form-encoded) request.
///
/// # Errors
///
/// Returns an error if the field is missing or not valid JSON.
pub fn parse_interactive_payload(form_body: &str) -> Result<Value, BotError> {
    for pair in form_body.split('&') {
        if let Some(eq_idx) = pair.find('=') {
            let key = &pair[..eq_idx];
            if key == "payload" {
                let raw_val = &pair[eq_idx + 1..];
                let decoded = decode_url_component(raw_val).map_err(|e| {
                    BotError::ParseError(format!("Failed to decode payload: {}", e))
                })?;
                let v: Value = serde_json::from_str(&decoded)
                    .map_err(|e| BotError::ParseError(format!("Invalid JSON payload: {}", e)))?;
                return Ok(v);
            }
        }
    }
    Err(BotError::ParseError("Missing payload field".to_string()))
}
