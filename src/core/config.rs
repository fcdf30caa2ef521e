use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub slack_signing_secret: String,
    pub slack_bot_token: String,
    pub openai_api_key: String,
    pub openai_model: Option<String>,
    // Optional sink configuration; a missing variable disables the sink.
    pub posthog_api_key: Option<String>,
    pub posthog_host: Option<String>,
    pub logship_source_token: Option<String>,
    pub usage_db_path: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: env::var("PORT")
                .ok()
                .map(|p| p.parse::<u16>().map_err(|e| format!("PORT: {}", e)))
                .transpose()?
                .unwrap_or(8080),
            slack_signing_secret: env::var("SLACK_SIGNING_SECRET")
                .map_err(|e| format!("SLACK_SIGNING_SECRET: {}", e))?,
            slack_bot_token: env::var("SLACK_BOT_TOKEN")
                .map_err(|e| format!("SLACK_BOT_TOKEN: {}", e))?,
            openai_api_key: env::var("OPENAI_API_KEY")
                .map_err(|e| format!("OPENAI_API_KEY: {}", e))?,
            openai_model: env::var("OPENAI_MODEL").ok(),
            posthog_api_key: env::var("POSTHOG_API_KEY").ok(),
            posthog_host: env::var("POSTHOG_HOST").ok(),
            logship_source_token: env::var("LOGSHIP_SOURCE_TOKEN").ok(),
            usage_db_path: env::var("USAGE_DB_PATH").ok(),
        })
    }
}
