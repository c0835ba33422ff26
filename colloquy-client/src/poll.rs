//! Incremental refresh scheduling
//!
//! Polling is level-triggered: it is the only way the client observes
//! asynchronous agent progress, so the manager keeps firing even when a
//! snapshot comes back unchanged. Cadence follows the conversation state -
//! short while the agent owes a reply, long once it has answered, parked
//! entirely while a send is in flight.

use crate::config::PollSettings;
use crate::error::ClientError;
use crate::events::ClientEvent;
use async_trait::async_trait;
use colloquy_core::{Conversation, ConversationId, MessageRole};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Scheduling state derived from the conversation snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// Last message came from the user; the agent owes a reply.
    AwaitingAgent,
    /// The agent has answered (or the conversation is empty).
    Idle,
    /// A send is in flight; no poll may be scheduled until it resolves.
    Disabled,
}

impl PollPhase {
    pub fn classify(last_role: Option<MessageRole>, send_in_flight: bool) -> Self {
        if send_in_flight {
            PollPhase::Disabled
        } else if last_role == Some(MessageRole::User) {
            PollPhase::AwaitingAgent
        } else {
            PollPhase::Idle
        }
    }
}

/// Poll delays resolved from configuration.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub awaiting_agent: Duration,
    pub idle: Duration,
}

impl PollConfig {
    pub fn from_settings(settings: &PollSettings) -> Self {
        Self {
            awaiting_agent: Duration::from_millis(settings.awaiting_agent_ms),
            idle: Duration::from_millis(settings.idle_ms),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::from_settings(&PollSettings::default())
    }
}

/// Delay before the next poll, or `None` while polling is disabled.
pub fn next_delay(phase: PollPhase, config: &PollConfig) -> Option<Duration> {
    match phase {
        PollPhase::AwaitingAgent => Some(config.awaiting_agent),
        PollPhase::Idle => Some(config.idle),
        PollPhase::Disabled => None,
    }
}

/// Fetching abstraction so the manager is testable without a server.
#[async_trait]
pub trait ConversationFetcher: Send + Sync + 'static {
    async fn fetch_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Conversation, ClientError>;
}

#[async_trait]
impl ConversationFetcher for crate::ApiClient {
    async fn fetch_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Conversation, ClientError> {
        self.get_conversation(conversation_id).await
    }
}

/// Handle to a running poll manager. Dropping it (or calling [`abort`])
/// cancels the pending timer, so switching conversations can never leave a
/// stale poll firing for the old id.
///
/// [`abort`]: PollHandle::abort
#[derive(Debug)]
pub struct PollHandle {
    conversation_id: ConversationId,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the poll loop for one conversation.
///
/// The loop is sequential by construction - fetch, emit, sleep, repeat - so
/// at most one fetch per conversation is ever in flight and requests cannot
/// pile up. `send_gate` carries the send-in-flight flag: while it reads
/// `true` the loop parks and re-arms when the flag clears.
pub fn spawn_poll_manager<F: ConversationFetcher>(
    fetcher: Arc<F>,
    conversation_id: ConversationId,
    config: PollConfig,
    send_gate: watch::Receiver<bool>,
    sender: mpsc::Sender<ClientEvent>,
) -> PollHandle {
    let task = tokio::spawn(async move {
        let mut send_gate = send_gate;
        loop {
            // Park while a send is in flight.
            while *send_gate.borrow() {
                if send_gate.changed().await.is_err() {
                    return;
                }
            }

            let delay = match fetcher.fetch_conversation(conversation_id).await {
                Ok(conversation) => {
                    let phase =
                        PollPhase::classify(conversation.last_role(), *send_gate.borrow());
                    tracing::trace!(%conversation_id, ?phase, "poll tick");
                    let event = ClientEvent::Snapshot {
                        conversation_id,
                        conversation: Box::new(conversation),
                    };
                    if sender.send(event).await.is_err() {
                        return;
                    }
                    next_delay(phase, &config).unwrap_or(config.awaiting_agent)
                }
                Err(error) => {
                    tracing::warn!(%conversation_id, %error, "poll fetch failed");
                    let event = ClientEvent::PollFailed {
                        conversation_id,
                        error: error.to_string(),
                    };
                    if sender.send(event).await.is_err() {
                        return;
                    }
                    config.idle
                }
            };
            tokio::time::sleep(delay).await;
        }
    });

    PollHandle {
        conversation_id,
        task,
    }
}
