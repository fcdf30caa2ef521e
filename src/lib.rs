/// recap - a Slack bot that summarizes recent channel messages in French.
///
/// One HTTP service receives Slack-signed triggers (the `/recap` slash
/// command, DM and in-channel `!recap` text commands, block-suggestion
/// autocomplete), resolves the target channel, pulls its recent history,
/// and asks an LLM for a bullet-point summary delivered back on the same
/// surface.
///
/// # Architecture
///
/// The system uses:
/// - axum for the inbound HTTP surface (commands, events, options, health)
/// - slack-morphism and raw Web API calls for Slack interactions
/// - the OpenAI chat-completions API for summarization
/// - Tokio for the async runtime
///
/// Analytics capture, remote log shipping and persisted usage rows are
/// pluggable sinks on pipeline checkpoints; the pipeline itself behaves
/// identically with or without them.
// Module declarations
pub mod ai;
pub mod api;
pub mod core;
pub mod errors;
pub mod ship;
pub mod sinks;
pub mod slack;

/// Configure structured logging with JSON output, optionally composed
/// with the remote log-shipping layer when a source token is configured.
///
/// Call once at startup, inside the Tokio runtime so shipped events have
/// an executor to run on.
pub fn setup_logging(logship_source_token: Option<String>) {
    use tracing_subscriber::prelude::*;

    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);
    let ship_layer = logship_source_token.map(ship::LogShipLayer::new);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(ship_layer)
        .init();
}
