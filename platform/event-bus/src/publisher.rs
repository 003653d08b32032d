//! Event publisher
//!
//! Turns a domain action into an envelope on its subject. Request handlers
//! call the `*_detached` variants: the user-visible action has already
//! succeeded, and a broker outage must neither delay nor fail it.

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::envelope::{self, DomainEvent, EnvelopeError, EventEnvelope};
use crate::{BusError, EventBus};

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error(transparent)]
    Bus(#[from] BusError),
}

#[derive(Clone)]
pub struct EventPublisher {
    bus: Arc<dyn EventBus>,
}

impl EventPublisher {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self { bus }
    }

    /// Encode and publish one envelope to its event-type subject
    pub async fn publish(&self, envelope: &EventEnvelope) -> Result<(), PublishError> {
        let bytes = envelope::encode(envelope)?;
        let subject = envelope.subject();

        self.bus.publish(&subject, bytes).await?;

        tracing::info!(
            subject = %subject,
            event_type = envelope.event_type(),
            event_id = ?envelope.event_id,
            "Published event"
        );
        Ok(())
    }

    /// Publish without blocking the caller
    ///
    /// The publish runs in its own task. Failures are logged there and never
    /// reach the caller's error path.
    pub fn publish_detached(&self, envelope: EventEnvelope) -> JoinHandle<()> {
        let publisher = self.clone();
        let label = envelope.event_type();
        spawn_detached(label, async move { publisher.publish(&envelope).await })
    }

    pub async fn session_created(
        &self,
        session_id: Uuid,
        coach_id: Uuid,
        title: String,
        start_at: chrono::DateTime<Utc>,
    ) -> Result<(), PublishError> {
        self.publish(&EventEnvelope::new(DomainEvent::SessionCreated {
            session_id,
            coach_id,
            title,
            start_at,
        }))
        .await
    }

    pub async fn session_joined(&self, session_id: Uuid, user_id: Uuid) -> Result<(), PublishError> {
        self.publish(&Self::joined_envelope(session_id, user_id)).await
    }

    /// Fire-and-forget variant used right after a join is committed
    pub fn session_joined_detached(&self, session_id: Uuid, user_id: Uuid) -> JoinHandle<()> {
        self.publish_detached(Self::joined_envelope(session_id, user_id))
    }

    pub async fn chat_message_received(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        user_name: Option<String>,
        content: String,
    ) -> Result<(), PublishError> {
        self.publish(&EventEnvelope::new(DomainEvent::ChatMessageReceived {
            session_id,
            user_id,
            content,
            user_name,
        }))
        .await
    }

    fn joined_envelope(session_id: Uuid, user_id: Uuid) -> EventEnvelope {
        EventEnvelope::new(DomainEvent::SessionJoined {
            session_id,
            user_id,
            joined_at: Utc::now(),
        })
    }
}

/// Run a side effect as a detached task whose only error sink is the log
pub fn spawn_detached<F, E>(label: &'static str, task: F) -> JoinHandle<()>
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = task.await {
            tracing::error!(
                task = label,
                error = %e,
                "Detached side effect failed; downstream effect may be lost"
            );
        }
    })
}
