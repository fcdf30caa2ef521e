//! Analytics capture sink (`PostHog`).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

use super::{RequestContext, RequestSink};
use crate::core::models::RequestOutcome;

pub struct PosthogSink {
    api_key: String,
    capture_url: String,
    client: Client,
}

impl PosthogSink {
    #[must_use]
    pub fn new(api_key: String, host: String) -> Self {
        let capture_url = format!("{}/capture/", host.trim_end_matches('/'));
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            capture_url,
            client,
        }
    }

    async fn capture(&self, event: &str, ctx: &RequestContext, outcome: Option<RequestOutcome>) {
        let mut properties = json!({
            "correlation_id": ctx.correlation_id,
            "channel": ctx.channel_id,
            "channel_name": ctx.channel_name,
        });
        if let Some(outcome) = outcome {
            properties["outcome"] = json!(outcome.as_str());
        }

        let payload = json!({
            "api_key": self.api_key,
            "event": event,
            "distinct_id": ctx.requester,
            "properties": properties,
        });

        if let Err(e) = self.client.post(&self.capture_url).json(&payload).send().await {
            warn!("Failed to send analytics event {}: {}", event, e);
        }
    }
}

#[async_trait]
impl RequestSink for PosthogSink {
    async fn request_received(&self, ctx: &RequestContext) {
        self.capture("summarize_command_used", ctx, None).await;
    }

    async fn request_completed(&self, ctx: &RequestContext, outcome: RequestOutcome) {
        self.capture("summarize_request_completed", ctx, Some(outcome))
            .await;
    }

    async fn request_failed(&self, ctx: &RequestContext, outcome: RequestOutcome) {
        self.capture("summarize_request_failed", ctx, Some(outcome))
            .await;
    }
}
