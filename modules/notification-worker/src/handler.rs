use async_trait::async_trait;
use event_bus::{DomainEvent, EventEnvelope};
use event_consumer::{EventHandler, Failure};
use std::sync::Arc;

use crate::push::{PushError, PushNotification, PushSender, SESSION_JOINED_ALERT};
use crate::tokens::DeviceTokenStore;

/// Pushes a "joined" alert to every device of the joining user
///
/// A user with no registered devices is a success. Partial delivery is a
/// success too. A lookup failure, or every push failing with at least one
/// transport error, is retried; every device being rejected is not.
pub struct SessionJoinedNotifier {
    tokens: Arc<dyn DeviceTokenStore>,
    sender: Arc<dyn PushSender>,
    topic: Option<String>,
}

impl SessionJoinedNotifier {
    pub fn new(
        tokens: Arc<dyn DeviceTokenStore>,
        sender: Arc<dyn PushSender>,
        topic: Option<String>,
    ) -> Self {
        Self {
            tokens,
            sender,
            topic,
        }
    }
}

#[async_trait]
impl EventHandler for SessionJoinedNotifier {
    fn name(&self) -> &'static str {
        "session_joined_notifier"
    }

    fn event_type(&self) -> &'static str {
        DomainEvent::SESSION_JOINED
    }

    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), Failure> {
        let DomainEvent::SessionJoined {
            session_id,
            user_id,
            ..
        } = &envelope.event
        else {
            return Err(Failure::Decode(format!(
                "expected session.joined, got {}",
                envelope.event_type()
            )));
        };

        tracing::info!(
            user_id = %user_id,
            session_id = %session_id,
            "Handling session joined notification"
        );

        let tokens = self
            .tokens
            .device_tokens(*user_id)
            .await
            .map_err(|e| Failure::Downstream(e.to_string()))?;

        if tokens.is_empty() {
            tracing::info!(user_id = %user_id, "No device tokens; nothing to send");
            return Ok(());
        }

        let mut delivered = 0usize;
        let mut errors = Vec::new();

        for token in &tokens {
            let notification =
                PushNotification::alert(token.as_str(), self.topic.clone(), SESSION_JOINED_ALERT);

            match self.sender.push(&notification).await {
                Ok(message_id) => {
                    delivered += 1;
                    tracing::debug!(message_id = %message_id, "Push accepted");
                }
                Err(e) => {
                    tracing::warn!(device_token = %token, error = %e, "Push failed");
                    errors.push(e);
                }
            }
        }

        tracing::info!(
            user_id = %user_id,
            devices = tokens.len(),
            delivered = delivered,
            "Session joined notifications dispatched"
        );

        if delivered > 0 {
            return Ok(());
        }

        match errors
            .iter()
            .find(|e| matches!(e, PushError::Transport(_)))
        {
            Some(transport) => Err(Failure::Downstream(transport.to_string())),
            None => Err(Failure::Rejected(
                errors
                    .last()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "no push accepted".to_string()),
            )),
        }
    }
}
