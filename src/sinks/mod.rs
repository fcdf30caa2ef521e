//! Pluggable sinks invoked at pipeline checkpoints (request received,
//! completed, failed). The pipeline behaves identically whether or not any
//! sink is configured; sink failures are logged and never affect the
//! request.

pub mod posthog;
pub mod usage;

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::models::RequestOutcome;

pub use posthog::PosthogSink;
pub use usage::UsageStore;

/// What is known about a request at a checkpoint. Channel fields are
/// filled in once resolution has happened.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub correlation_id: String,
    pub requester: String,
    pub channel_id: Option<String>,
    pub channel_name: Option<String>,
}

#[async_trait]
pub trait RequestSink: Send + Sync {
    async fn request_received(&self, ctx: &RequestContext);
    async fn request_completed(&self, ctx: &RequestContext, outcome: RequestOutcome);
    async fn request_failed(&self, ctx: &RequestContext, outcome: RequestOutcome);
}

/// Fan-out over every configured sink.
#[derive(Clone, Default)]
pub struct Sinks {
    sinks: Vec<Arc<dyn RequestSink>>,
}

impl Sinks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Arc<dyn RequestSink>) {
        self.sinks.push(sink);
    }

    pub async fn request_received(&self, ctx: &RequestContext) {
        for sink in &self.sinks {
            sink.request_received(ctx).await;
        }
    }

    pub async fn request_completed(&self, ctx: &RequestContext, outcome: RequestOutcome) {
        for sink in &self.sinks {
            sink.request_completed(ctx, outcome).await;
        }
    }

    pub async fn request_failed(&self, ctx: &RequestContext, outcome: RequestOutcome) {
        for sink in &self.sinks {
            sink.request_failed(ctx, outcome).await;
        }
    }
}
