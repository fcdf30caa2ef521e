//! Slack API client module
//!
//! Typed slack-morphism calls where the shapes fit, raw Web API calls with
//! `ok`/`error` body inspection where Slack's error codes must be told
//! apart (history fetch, channel directory).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::Client;
use serde_json::{Value, json};
use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::prelude::{SlackApiChatPostMessageRequest, SlackApiUsersInfoRequest};
use slack_morphism::{
    SlackApiToken, SlackApiTokenValue, SlackChannelId, SlackMessageContent, SlackUserId,
};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::warn;

use crate::core::models::{ChannelMessage, ChannelRef};
use crate::core::platform::ChatPlatform;
use crate::errors::BotError;

// Build the Slack client connector safely without panicking.
// If connector construction fails, store None and surface a BotError at call sites.
static SLACK_CLIENT: std::sync::LazyLock<Option<SlackHyperClient>> =
    std::sync::LazyLock::new(|| match SlackClientHyperConnector::new() {
        Ok(connector) => Some(SlackHyperClient::new(connector)),
        Err(e) => {
            warn!("Failed to create Slack HTTP connector: {}", e);
            None
        }
    });

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Directory paging size for `users.conversations`.
const DIRECTORY_PAGE_LIMIT: u32 = 200;

/// Who the bot is, from `auth.test`.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub user_id: String,
    pub team_name: String,
}

/// Slack Web API client.
pub struct SlackClient {
    token: SlackApiToken,
    bearer: String,
}

impl SlackClient {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self {
            token: SlackApiToken::new(SlackApiTokenValue::new(token.clone())),
            bearer: token,
        }
    }

    fn session_client() -> Result<&'static SlackHyperClient, BotError> {
        SLACK_CLIENT
            .as_ref()
            .ok_or_else(|| BotError::ApiError("Slack HTTP connector not initialized".to_string()))
    }

    /// Raw Web API POST returning the parsed body after checking `ok`.
    async fn call_web_api(&self, method: &str, payload: &Value) -> Result<Value, BotError> {
        let url = format!("https://slack.com/api/{method}");
        let resp = HTTP_CLIENT
            .post(&url)
            .bearer_auth(&self.bearer)
            .json(payload)
            .send()
            .await
            .map_err(|e| BotError::HttpError(format!("{method} request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(BotError::ApiError(format!("{method} HTTP {}", resp.status())));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| BotError::ApiError(format!("{method} JSON parse error: {e}")))?;

        if !body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            let code = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            return Err(map_slack_error(method, &code));
        }

        Ok(body)
    }

    /// # Errors
    ///
    /// Returns an error if `auth.test` fails or the response is malformed.
    pub async fn bot_identity(&self) -> Result<BotIdentity, BotError> {
        let body = self.call_web_api("auth.test", &json!({})).await?;
        let user_id = body
            .get("user_id")
            .and_then(Value::as_str)
            .ok_or_else(|| BotError::ApiError("auth.test: no user_id".to_string()))?
            .to_string();
        let team_name = body
            .get("team")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(BotIdentity { user_id, team_name })
    }

    /// Post a plain-text message to a channel (or an IM channel).
    ///
    /// # Errors
    ///
    /// Returns an error if the Slack API call fails.
    pub async fn post_message(&self, channel_id: &str, message: &str) -> Result<(), BotError> {
        let session = Self::session_client()?.open_session(&self.token);

        let post_req = SlackApiChatPostMessageRequest::new(
            SlackChannelId(channel_id.to_string()),
            SlackMessageContent::new().with_text(message.to_string()),
        );

        session.chat_post_message(&post_req).await?;

        Ok(())
    }

    /// Finish a slash-command request through its `response_url`,
    /// replacing the placeholder acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP call fails or Slack rejects it.
    pub async fn respond_via_url(&self, response_url: &str, message: &str) -> Result<(), BotError> {
        let payload = json!({
            "response_type": "in_channel",
            "replace_original": true,
            "text": message,
        });

        let resp = HTTP_CLIENT
            .post(response_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| BotError::HttpError(format!("response_url POST failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(BotError::ApiError(format!(
                "response_url POST HTTP {}",
                resp.status()
            )));
        }

        Ok(())
    }

    /// Display names for a set of user ids, fetched concurrently. Lookups
    /// that fail fall back to the raw id so one missing profile never
    /// fails the request.
    async fn display_names(&self, user_ids: &HashSet<String>) -> HashMap<String, String> {
        let fetches = user_ids
            .iter()
            .map(|uid| async move { (uid.clone(), self.fetch_display_name(uid).await) });

        let mut cache = HashMap::new();
        for (uid, name) in join_all(fetches).await {
            cache.insert(uid, name);
        }
        cache
    }

    async fn fetch_display_name(&self, user_id: &str) -> String {
        let session = match Self::session_client() {
            Ok(client) => client.open_session(&self.token),
            Err(_) => return user_id.to_string(),
        };

        let user_info_req = SlackApiUsersInfoRequest::new(SlackUserId(user_id.to_string()));
        match session.users_info(&user_info_req).await {
            Ok(info) => info
                .user
                .profile
                .as_ref()
                .and_then(|p| p.real_name.clone())
                .or_else(|| {
                    info.user
                        .profile
                        .as_ref()
                        .and_then(|p| p.display_name.clone())
                })
                .unwrap_or_else(|| user_id.to_string()),
            Err(e) => {
                warn!("Failed to fetch user info for {}: {:?}", user_id, e);
                user_id.to_string()
            }
        }
    }
}

#[async_trait]
impl ChatPlatform for SlackClient {
    async fn accessible_channels(&self, requester_id: &str) -> Result<Vec<ChannelRef>, BotError> {
        let mut channels = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut payload = json!({
                "user": requester_id,
                "types": "public_channel,private_channel",
                "limit": DIRECTORY_PAGE_LIMIT,
            });
            if let Some(c) = &cursor {
                payload["cursor"] = Value::String(c.clone());
            }

            let body = self.call_web_api("users.conversations", &payload).await?;

            if let Some(list) = body.get("channels").and_then(Value::as_array) {
                for entry in list {
                    let Some(id) = entry.get("id").and_then(Value::as_str) else {
                        continue;
                    };
                    let name = entry.get("name").and_then(Value::as_str).unwrap_or("");
                    let team_id = entry
                        .get("context_team_id")
                        .and_then(Value::as_str)
                        .unwrap_or("");
                    channels.push(ChannelRef {
                        id: id.to_string(),
                        name: name.to_string(),
                        team_id: team_id.to_string(),
                    });
                }
            }

            cursor = body
                .get("response_metadata")
                .and_then(|m| m.get("next_cursor"))
                .and_then(Value::as_str)
                .filter(|c| !c.is_empty())
                .map(ToString::to_string);

            if cursor.is_none() {
                break;
            }
        }

        Ok(channels)
    }

    async fn channel_history(
        &self,
        channel_id: &str,
        limit: u16,
    ) -> Result<Vec<ChannelMessage>, BotError> {
        let payload = json!({
            "channel": channel_id,
            "limit": limit,
        });

        let body = self.call_web_api("conversations.history", &payload).await?;

        let raw_messages = body
            .get("messages")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        // Resolve author display names once per unique sender.
        let user_ids: HashSet<String> = raw_messages
            .iter()
            .filter_map(|m| m.get("user").and_then(Value::as_str))
            .map(ToString::to_string)
            .collect();
        let names = self.display_names(&user_ids).await;

        let messages = raw_messages
            .iter()
            .map(|m| {
                let author = m
                    .get("user")
                    .and_then(Value::as_str)
                    .map_or_else(
                        || "Unknown".to_string(),
                        |uid| names.get(uid).cloned().unwrap_or_else(|| uid.to_string()),
                    );
                let is_automated = m.get("bot_id").is_some()
                    || m.get("subtype").and_then(Value::as_str) == Some("bot_message");
                let text = m
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();

                ChannelMessage {
                    timestamp: parse_slack_ts(m.get("ts").and_then(Value::as_str).unwrap_or("")),
                    author,
                    is_automated,
                    text,
                }
            })
            .collect();

        Ok(messages)
    }
}

/// Slack message timestamps are epoch seconds with a fractional part
/// (`"1712345678.000200"`).
fn parse_slack_ts(ts: &str) -> DateTime<Utc> {
    let secs = ts
        .split('.')
        .next()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0);
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// Map a Slack error code to the taxonomy. Insufficient permission is kept
/// distinct so the dispatcher can report it as a request-scoped failure.
fn map_slack_error(method: &str, code: &str) -> BotError {
    match code {
        "not_in_channel" | "access_denied" | "missing_scope" => BotError::ChannelAccessForbidden,
        "channel_not_found" => BotError::ChannelNotFound,
        _ => BotError::ApiError(format!("{method} error: {code}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slack_ts() {
        let dt = parse_slack_ts("1712345678.000200");
        assert_eq!(dt.timestamp(), 1_712_345_678);
    }

    #[test]
    fn test_forbidden_codes_map_distinctly() {
        assert!(matches!(
            map_slack_error("conversations.history", "not_in_channel"),
            BotError::ChannelAccessForbidden
        ));
        assert!(matches!(
            map_slack_error("conversations.history", "channel_not_found"),
            BotError::ChannelNotFound
        ));
        assert!(matches!(
            map_slack_error("conversations.history", "ratelimited"),
            BotError::ApiError(_)
        ));
    }
}
