use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use recap::api::{self, AppState};
use recap::core::config::AppConfig;
use recap::sinks::{PosthogSink, Sinks, UsageStore};
use recap::slack::SlackBot;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().map_err(anyhow::Error::msg)?;
    recap::setup_logging(config.logship_source_token.clone());

    let mut sinks = Sinks::new();
    if let (Some(api_key), Some(host)) = (
        config.posthog_api_key.clone(),
        config.posthog_host.clone(),
    ) {
        sinks.push(Arc::new(PosthogSink::new(api_key, host)));
        info!("Analytics capture enabled");
    }
    if let Some(path) = config.usage_db_path.clone() {
        match UsageStore::open(&path) {
            Ok(store) => {
                sinks.push(Arc::new(store));
                info!(path = %path, "Usage store enabled");
            }
            Err(e) => warn!("Failed to open usage store at {}: {}", path, e),
        }
    }

    let bot = Arc::new(SlackBot::new(&config, sinks));
    let state = AppState {
        config: Arc::new(config.clone()),
        bot,
    };

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;

    info!(port = config.port, "recap bot listening");
    axum::serve(listener, app)
        .await
        .context("HTTP server terminated")?;

    Ok(())
}
