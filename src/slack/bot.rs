use super::client::SlackClient;
use crate::ai::LlmClient;
use crate::core::config::AppConfig;
use crate::core::dispatch::{Reply, run_request};
use crate::core::models::Trigger;
use crate::errors::BotError;
use crate::sinks::Sinks;

/// Composition root for one running bot: the Slack client, the LLM client
/// and the configured sinks, built once at startup and shared by every
/// handler.
pub struct SlackBot {
    slack_client: SlackClient,
    llm_client: LlmClient,
    sinks: Sinks,
}

impl SlackBot {
    #[must_use]
    pub fn new(config: &AppConfig, sinks: Sinks) -> Self {
        let slack_client = SlackClient::new(config.slack_bot_token.clone());
        let llm_client = LlmClient::new(config.openai_api_key.clone(), config.openai_model.clone());

        Self {
            slack_client,
            llm_client,
            sinks,
        }
    }

    #[must_use]
    pub fn slack_client(&self) -> &SlackClient {
        &self.slack_client
    }

    /// Run one trigger through the pipeline. Infallible: the reply always
    /// carries either the summary or a user-facing failure message.
    pub async fn handle_trigger(&self, trigger: &Trigger) -> Reply {
        run_request(&self.slack_client, &self.llm_client, &self.sinks, trigger).await
    }

    /// # Errors
    ///
    /// Returns an error if the delivery call to Slack fails.
    pub async fn deliver_to_channel(&self, channel_id: &str, text: &str) -> Result<(), BotError> {
        self.slack_client.post_message(channel_id, text).await
    }
}
