//! Append-only usage rows, the only durable state in the system.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, params};
use std::sync::{Arc, Mutex};
use tracing::warn;

use super::{RequestContext, RequestSink};
use crate::core::models::{RequestOutcome, UsageRecord};

/// Sqlite-backed store with one insert per terminal request state.
pub struct UsageStore {
    conn: Arc<Mutex<Connection>>,
}

impl UsageStore {
    pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS usage (
                correlation_id TEXT NOT NULL,
                requester      TEXT NOT NULL,
                channel_id     TEXT,
                channel_name   TEXT,
                outcome        TEXT NOT NULL,
                at             TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn append(&self, record: UsageRecord) {
        let conn = Arc::clone(&self.conn);
        let result = tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            conn.execute(
                "INSERT INTO usage
                    (correlation_id, requester, channel_id, channel_name, outcome, at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.correlation_id,
                    record.requester,
                    record.channel_id,
                    record.channel_name,
                    record.outcome,
                    record.at.to_rfc3339(),
                ],
            )
        })
        .await;

        match result {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!("Failed to append usage row: {}", e),
            Err(e) => warn!("Usage row task failed: {}", e),
        }
    }

    fn record(ctx: &RequestContext, outcome: RequestOutcome) -> UsageRecord {
        UsageRecord {
            correlation_id: ctx.correlation_id.clone(),
            requester: ctx.requester.clone(),
            channel_id: ctx.channel_id.clone(),
            channel_name: ctx.channel_name.clone(),
            outcome: outcome.as_str().to_string(),
            at: Utc::now(),
        }
    }
}

#[async_trait]
impl RequestSink for UsageStore {
    async fn request_received(&self, _ctx: &RequestContext) {
        // Usage rows are written only at terminal states.
    }

    async fn request_completed(&self, ctx: &RequestContext, outcome: RequestOutcome) {
        self.append(Self::record(ctx, outcome)).await;
    }

    async fn request_failed(&self, ctx: &RequestContext, outcome: RequestOutcome) {
        self.append(Self::record(ctx, outcome)).await;
    }
}
