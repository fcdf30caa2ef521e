//! Remote log shipping: a tracing layer that forwards INFO-and-above
//! events to the Better Stack ingest endpoint, fire-and-forget.

use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

const INGEST_URL: &str = "https://in.logs.betterstack.com/";

pub struct LogShipLayer {
    source_token: String,
    client: Client,
}

impl LogShipLayer {
    #[must_use]
    pub fn new(source_token: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            source_token,
            client,
        }
    }
}

impl<S: Subscriber> Layer<S> for LogShipLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level > Level::INFO {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if visitor.message.is_empty() {
            return;
        }

        let payload = json!({
            "message": visitor.message,
            "level": level.as_str(),
        });

        // Shipping must never block or fail the caller; outside a runtime
        // (early startup, tests) events are simply not forwarded.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let client = self.client.clone();
        let token = self.source_token.clone();
        handle.spawn(async move {
            let _ = client
                .post(INGEST_URL)
                .bearer_auth(token)
                .json(&payload)
                .send()
                .await;
        });
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}
