//! HTTP front door: Slack-signed inbound routes plus the healthcheck.

pub mod commands;
pub mod events;
pub mod health;
pub mod options;
pub mod parsing;
pub mod signature;

use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use std::sync::Arc;
use tracing::error;

use crate::core::config::AppConfig;
use crate::slack::SlackBot;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub bot: Arc<SlackBot>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::get_health))
        .route("/slack/commands", post(commands::handle_slash_command))
        .route("/slack/events", post(events::handle_event))
        .route("/slack/options", post(options::handle_block_suggestion))
        .with_state(state)
}

/// Reject the request unless it carries a valid Slack signature.
pub(crate) fn require_valid_signature(
    headers: &HeaderMap,
    body: &str,
    config: &AppConfig,
) -> Result<(), Response> {
    let Some(sig) = headers
        .get("x-slack-signature")
        .and_then(|v| v.to_str().ok())
    else {
        error!("Missing X-Slack-Signature header");
        return Err((StatusCode::UNAUTHORIZED, "Missing X-Slack-Signature header").into_response());
    };

    let Some(timestamp) = headers
        .get("x-slack-request-timestamp")
        .and_then(|v| v.to_str().ok())
    else {
        error!("Missing X-Slack-Request-Timestamp header");
        return Err((
            StatusCode::UNAUTHORIZED,
            "Missing X-Slack-Request-Timestamp header",
        )
            .into_response());
    };

    if !signature::verify_slack_signature(body, timestamp, sig, &config.slack_signing_secret) {
        error!("Slack signature verification failed");
        return Err((StatusCode::UNAUTHORIZED, "Invalid Slack signature").into_response());
    }

    Ok(())
}
