//! End-to-end pipeline tests against a mock platform and summarizer.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};

use recap::ai::Summarizer;
use recap::core::dispatch::run_request;
use recap::core::models::{ChannelMessage, ChannelRef, RequestOutcome, Trigger};
use recap::core::platform::ChatPlatform;
use recap::errors::BotError;
use recap::sinks::Sinks;

struct MockPlatform {
    channels: Vec<ChannelRef>,
    history: Vec<ChannelMessage>,
    forbidden: bool,
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    async fn accessible_channels(&self, _requester_id: &str) -> Result<Vec<ChannelRef>, BotError> {
        Ok(self.channels.clone())
    }

    async fn channel_history(
        &self,
        _channel_id: &str,
        _limit: u16,
    ) -> Result<Vec<ChannelMessage>, BotError> {
        if self.forbidden {
            return Err(BotError::ChannelAccessForbidden);
        }
        Ok(self.history.clone())
    }
}

enum Canned {
    Text(&'static str),
    TransportFailure(&'static str),
}

struct MockSummarizer {
    calls: AtomicUsize,
    canned: Canned,
}

impl MockSummarizer {
    fn text(text: &'static str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            canned: Canned::Text(text),
        }
    }

    fn failing(message: &'static str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            canned: Canned::TransportFailure(message),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, _prompt: &str) -> Result<String, BotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.canned {
            Canned::Text(t) => Ok((*t).to_string()),
            Canned::TransportFailure(m) => Err(BotError::SummarizationApi((*m).to_string())),
        }
    }
}

fn ch(id: &str, name: &str) -> ChannelRef {
    ChannelRef {
        id: id.to_string(),
        name: name.to_string(),
        team_id: "T1".to_string(),
    }
}

fn msg(minute: u32, author: &str, automated: bool, text: &str) -> ChannelMessage {
    ChannelMessage {
        timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, minute, 0).unwrap(),
        author: author.to_string(),
        is_automated: automated,
        text: text.to_string(),
    }
}

fn default_history() -> Vec<ChannelMessage> {
    vec![
        msg(3, "carol", false, "on livre vendredi"),
        msg(2, "bot", true, "rappel automatique"),
        msg(1, "alice", false, "la revue est terminée"),
    ]
}

#[tokio::test]
async fn test_successful_slash_request_delivers_headed_summary() {
    let platform = MockPlatform {
        channels: vec![ch("C1", "general")],
        history: default_history(),
        forbidden: false,
    };
    let summarizer = MockSummarizer::text("• La revue est terminée\n• Livraison vendredi");

    let trigger = Trigger::SlashCommand {
        requester: "U1".to_string(),
        channel_id: "C1".to_string(),
    };
    let reply = run_request(&platform, &summarizer, &Sinks::new(), &trigger).await;

    assert_eq!(reply.outcome, RequestOutcome::Summarized);
    assert!(reply.text.starts_with("*Résumé de #general:*\n"));
    assert!(reply.text.contains("Livraison vendredi"));
    assert_eq!(summarizer.call_count(), 1);
}

#[tokio::test]
async fn test_unknown_channel_id_short_circuits_before_any_api_call() {
    let platform = MockPlatform {
        channels: vec![ch("C1", "general")],
        history: default_history(),
        forbidden: false,
    };
    let summarizer = MockSummarizer::text("inutilisé");

    let trigger = Trigger::SlashCommand {
        requester: "U1".to_string(),
        channel_id: "C404".to_string(),
    };
    let reply = run_request(&platform, &summarizer, &Sinks::new(), &trigger).await;

    assert_eq!(reply.outcome, RequestOutcome::ChannelNotFound);
    assert_eq!(reply.text, "Canal introuvable.");
    assert_eq!(summarizer.call_count(), 0);
}

#[tokio::test]
async fn test_ambiguous_fuzzy_query_lists_candidates_and_skips_summarization() {
    let platform = MockPlatform {
        channels: vec![ch("C1", "general-chat"), ch("C2", "general-help")],
        history: default_history(),
        forbidden: false,
    };
    let summarizer = MockSummarizer::text("inutilisé");

    let trigger = Trigger::DirectMessage {
        requester: "U1".to_string(),
        query: "general".to_string(),
    };
    let reply = run_request(&platform, &summarizer, &Sinks::new(), &trigger).await;

    assert_eq!(reply.outcome, RequestOutcome::ChannelAmbiguous);
    assert!(reply.text.contains("#general-chat"));
    assert!(reply.text.contains("#general-help"));
    assert!(reply.text.contains("Précisez"));
    assert_eq!(summarizer.call_count(), 0);
}

#[tokio::test]
async fn test_fuzzy_query_with_no_match_reports_no_match() {
    let platform = MockPlatform {
        channels: vec![ch("C1", "random")],
        history: default_history(),
        forbidden: false,
    };
    let summarizer = MockSummarizer::text("inutilisé");

    let trigger = Trigger::DirectMessage {
        requester: "U1".to_string(),
        query: "compta".to_string(),
    };
    let reply = run_request(&platform, &summarizer, &Sinks::new(), &trigger).await;

    assert_eq!(reply.outcome, RequestOutcome::ChannelNotFound);
    assert_eq!(reply.text, "Aucun canal ne correspond à cette recherche.");
    assert_eq!(summarizer.call_count(), 0);
}

#[tokio::test]
async fn test_forbidden_history_is_a_request_scoped_failure() {
    let platform = MockPlatform {
        channels: vec![ch("C1", "privé")],
        history: default_history(),
        forbidden: true,
    };
    let summarizer = MockSummarizer::text("inutilisé");

    let trigger = Trigger::SlashCommand {
        requester: "U1".to_string(),
        channel_id: "C1".to_string(),
    };
    let reply = run_request(&platform, &summarizer, &Sinks::new(), &trigger).await;

    assert_eq!(reply.outcome, RequestOutcome::ChannelForbidden);
    assert_eq!(reply.text, "Je n'ai pas accès à ce canal.");
    assert_eq!(summarizer.call_count(), 0);
}

#[tokio::test]
async fn test_empty_history_reports_nothing_to_summarize() {
    let platform = MockPlatform {
        channels: vec![ch("C1", "general")],
        history: vec![msg(1, "bot", true, "seulement des bots ici")],
        forbidden: false,
    };
    let summarizer = MockSummarizer::text("inutilisé");

    let trigger = Trigger::SlashCommand {
        requester: "U1".to_string(),
        channel_id: "C1".to_string(),
    };
    let reply = run_request(&platform, &summarizer, &Sinks::new(), &trigger).await;

    assert_eq!(reply.outcome, RequestOutcome::NothingToSummarize);
    assert_eq!(reply.text, "Aucun message récent à résumer.");
    assert_eq!(summarizer.call_count(), 0);
}

#[tokio::test]
async fn test_api_transport_error_still_delivers_a_reply() {
    let platform = MockPlatform {
        channels: vec![ch("C1", "general")],
        history: default_history(),
        forbidden: false,
    };
    let summarizer = MockSummarizer::failing("connection reset by peer");

    let trigger = Trigger::SlashCommand {
        requester: "U1".to_string(),
        channel_id: "C1".to_string(),
    };
    let reply = run_request(&platform, &summarizer, &Sinks::new(), &trigger).await;

    assert_eq!(reply.outcome, RequestOutcome::ApiError);
    assert!(reply.text.starts_with("*Résumé de #general:*\n"));
    assert!(reply.text.contains("Erreur de l'API de résumé"));
    assert!(reply.text.contains("connection reset by peer"));
}

#[tokio::test]
async fn test_dangling_trailing_bullet_is_stripped_before_delivery() {
    let platform = MockPlatform {
        channels: vec![ch("C1", "general")],
        history: default_history(),
        forbidden: false,
    };
    let summarizer = MockSummarizer::text("• Premier point\n• Deuxième point\n•");

    let trigger = Trigger::SlashCommand {
        requester: "U1".to_string(),
        channel_id: "C1".to_string(),
    };
    let reply = run_request(&platform, &summarizer, &Sinks::new(), &trigger).await;

    assert_eq!(reply.outcome, RequestOutcome::Summarized);
    assert!(reply.text.ends_with("• Deuxième point"));
}

#[tokio::test]
async fn test_truncated_prompt_adds_suffix_to_header() {
    // 40 messages of 600+ chars each push the joined text past the
    // 20,000-char ceiling.
    let mut history = Vec::new();
    for i in 0..40 {
        history.push(msg(
            u32::try_from(i).unwrap(),
            "alice",
            false,
            &"x".repeat(600),
        ));
    }
    let platform = MockPlatform {
        channels: vec![ch("C1", "general")],
        history,
        forbidden: false,
    };
    let summarizer = MockSummarizer::text("• Beaucoup de texte");

    let trigger = Trigger::SlashCommand {
        requester: "U1".to_string(),
        channel_id: "C1".to_string(),
    };
    let reply = run_request(&platform, &summarizer, &Sinks::new(), &trigger).await;

    assert_eq!(reply.outcome, RequestOutcome::Summarized);
    assert!(reply.text.starts_with("*Résumé de #general (last messages only):*\n"));
}
