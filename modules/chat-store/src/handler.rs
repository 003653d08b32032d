use async_trait::async_trait;
use event_bus::{DomainEvent, EventEnvelope};
use event_consumer::{EventHandler, Failure};
use std::sync::Arc;

use crate::repository::{ChatMessage, ChatRepository, SaveOutcome};

/// Writes each received chat message to the chat history
pub struct ChatPersistenceHandler {
    repository: Arc<dyn ChatRepository>,
}

impl ChatPersistenceHandler {
    pub fn new(repository: Arc<dyn ChatRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl EventHandler for ChatPersistenceHandler {
    fn name(&self) -> &'static str {
        "chat_persistence"
    }

    fn event_type(&self) -> &'static str {
        DomainEvent::CHAT_MESSAGE_RECEIVED
    }

    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), Failure> {
        let DomainEvent::ChatMessageReceived {
            session_id,
            user_id,
            content,
            user_name,
        } = &envelope.event
        else {
            return Err(Failure::Decode(format!(
                "expected chat.message.received, got {}",
                envelope.event_type()
            )));
        };

        let message = ChatMessage {
            message_id: envelope.event_id,
            session_id: *session_id,
            user_id: *user_id,
            user_name: user_name.clone(),
            content: content.clone(),
        };

        let outcome = self
            .repository
            .save_message(&message)
            .await
            .map_err(|e| Failure::Downstream(e.to_string()))?;

        match outcome {
            SaveOutcome::Inserted => tracing::info!(
                session_id = %session_id,
                user_id = %user_id,
                message_id = ?envelope.event_id,
                "Chat message saved"
            ),
            SaveOutcome::Duplicate => tracing::info!(
                message_id = ?envelope.event_id,
                "Chat message already saved, skipping"
            ),
        }

        Ok(())
    }
}
