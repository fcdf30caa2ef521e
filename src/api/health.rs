//! Healthcheck endpoint for uptime probes.

use axum::Json;
use chrono::Utc;

pub async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "checked_at": Utc::now(),
    }))
}
