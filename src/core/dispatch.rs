//! Dispatch Handler: drives one request through its state machine
//! (`received → resolving_channel → history_fetched → prompt_built →
//! summarizing → summarized`) and guarantees exactly one reply per
//! trigger, whatever happens along the way.

use tracing::{error, info};
use uuid::Uuid;

use crate::ai::{Summarizer, polish_summary};
use crate::core::models::{ChannelRef, RequestOutcome, SummaryRequest, SummaryResult, Trigger};
use crate::core::normalize::normalize_history;
use crate::core::platform::{ChatPlatform, HISTORY_FETCH_LIMIT};
use crate::core::prompt::build_prompt;
use crate::core::resolve::{Resolution, resolve_direct, resolve_fuzzy};
use crate::errors::BotError;
use crate::sinks::{RequestContext, Sinks};

const MSG_NOT_FOUND: &str = "Canal introuvable.";
const MSG_NO_MATCH: &str = "Aucun canal ne correspond à cette recherche.";
const MSG_FORBIDDEN: &str = "Je n'ai pas accès à ce canal.";
const MSG_EMPTY: &str = "Aucun message récent à résumer.";
const MSG_UNEXPECTED: &str = "Une erreur est survenue lors du résumé.";

/// The single reply a trigger produces.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub outcome: RequestOutcome,
}

/// Run one summarization request end to end. Never errors: every failure
/// is folded into the reply text, and sinks fire at the received and
/// terminal checkpoints (ambiguous and forbidden outcomes included).
pub async fn run_request<P, S>(
    platform: &P,
    summarizer: &S,
    sinks: &Sinks,
    trigger: &Trigger,
) -> Reply
where
    P: ChatPlatform + ?Sized,
    S: Summarizer + ?Sized,
{
    let mut ctx = RequestContext {
        correlation_id: Uuid::new_v4().to_string(),
        requester: trigger.requester().to_string(),
        channel_id: None,
        channel_name: None,
    };

    info!(
        correlation_id = %ctx.correlation_id,
        requester = %ctx.requester,
        state = "received",
        "Summarization request received"
    );
    sinks.request_received(&ctx).await;

    let reply = match run_pipeline(platform, summarizer, trigger, &mut ctx).await {
        Ok(reply) => reply,
        Err(e) => failure_reply(trigger, &e),
    };

    info!(
        correlation_id = %ctx.correlation_id,
        outcome = reply.outcome.as_str(),
        "Summarization request finished"
    );
    if reply.outcome.is_success() {
        sinks.request_completed(&ctx, reply.outcome).await;
    } else {
        sinks.request_failed(&ctx, reply.outcome).await;
    }

    reply
}

async fn run_pipeline<P, S>(
    platform: &P,
    summarizer: &S,
    trigger: &Trigger,
    ctx: &mut RequestContext,
) -> Result<Reply, BotError>
where
    P: ChatPlatform + ?Sized,
    S: Summarizer + ?Sized,
{
    info!(correlation_id = %ctx.correlation_id, state = "resolving_channel", "Resolving target channel");
    let channels = platform.accessible_channels(trigger.requester()).await?;

    let channel = match trigger {
        Trigger::SlashCommand { channel_id, .. } | Trigger::CurrentChannel { channel_id, .. } => {
            resolve_direct(&channels, channel_id)
                .cloned()
                .ok_or(BotError::ChannelNotFound)?
        }
        Trigger::DirectMessage { query, .. } => match resolve_fuzzy(&channels, query) {
            Resolution::None => return Err(BotError::ChannelNotFound),
            Resolution::One(channel) => channel,
            Resolution::Many(candidates) => {
                return Err(BotError::ChannelAmbiguous(
                    candidates.into_iter().map(|c| c.name).collect(),
                ));
            }
        },
    };
    ctx.channel_id = Some(channel.id.clone());
    ctx.channel_name = Some(channel.name.clone());

    let request = SummaryRequest {
        messages: platform
            .channel_history(&channel.id, HISTORY_FETCH_LIMIT)
            .await?,
        channel_name: Some(channel.name.clone()),
    };
    info!(
        correlation_id = %ctx.correlation_id,
        state = "history_fetched",
        channel = %channel.name,
        count = request.messages.len(),
        "Fetched channel history"
    );

    let lines = normalize_history(&request.messages);
    if lines.is_empty() {
        return Err(BotError::NoMessagesAvailable);
    }

    let built = build_prompt(&lines);
    info!(
        correlation_id = %ctx.correlation_id,
        state = "prompt_built",
        truncated = built.truncated,
        "Prompt assembled"
    );

    info!(correlation_id = %ctx.correlation_id, state = "summarizing", "Calling summarization API");
    let (text, outcome) = match summarizer.summarize(&built.text).await {
        Ok(raw) => (polish_summary(&raw), RequestOutcome::Summarized),
        Err(e) => {
            // The error description is delivered in place of the summary;
            // the request still terminates with exactly one reply.
            error!(correlation_id = %ctx.correlation_id, "Summarization API call failed: {}", e);
            (
                format!("Erreur de l'API de résumé : {e}"),
                RequestOutcome::ApiError,
            )
        }
    };

    let summary = SummaryResult {
        text,
        truncated: built.truncated,
    };
    Ok(Reply {
        text: format_reply(&channel, &summary),
        outcome,
    })
}

/// Bold header naming the channel, truncation suffix when the prompt
/// dropped its oldest content.
fn format_reply(channel: &ChannelRef, summary: &SummaryResult) -> String {
    let suffix = if summary.truncated {
        " (last messages only)"
    } else {
        ""
    };
    format!("*Résumé de #{}{}:*\n{}", channel.name, suffix, summary.text)
}

fn failure_reply(trigger: &Trigger, error: &BotError) -> Reply {
    let (text, outcome) = match error {
        BotError::ChannelNotFound => {
            let text = if matches!(trigger, Trigger::DirectMessage { .. }) {
                MSG_NO_MATCH
            } else {
                MSG_NOT_FOUND
            };
            (text.to_string(), RequestOutcome::ChannelNotFound)
        }
        BotError::ChannelAmbiguous(names) => {
            (ambiguous_message(names), RequestOutcome::ChannelAmbiguous)
        }
        BotError::ChannelAccessForbidden => {
            (MSG_FORBIDDEN.to_string(), RequestOutcome::ChannelForbidden)
        }
        BotError::NoMessagesAvailable => {
            (MSG_EMPTY.to_string(), RequestOutcome::NothingToSummarize)
        }
        other => {
            error!("Summarization request failed unexpectedly: {}", other);
            (MSG_UNEXPECTED.to_string(), RequestOutcome::Failed)
        }
    };

    Reply { text, outcome }
}

fn ambiguous_message(names: &[String]) -> String {
    let listed = names
        .iter()
        .map(|n| format!("#{n}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Plusieurs canaux correspondent : {listed}. Précisez le nom du canal.")
}
