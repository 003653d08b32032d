//! Retrying subscriber
//!
//! Per message:
//!
//! ```text
//! Received -> Decoding -> DecodeFailed                      (logged, dropped)
//!                      -> Attempting(1..=max_attempts)
//!                           -> Done                         (effect succeeded)
//!                           -> Exhausted -> DLQ forward     (best effort)
//! ```
//!
//! Every message runs in its own task, so a message sleeping in backoff never
//! holds up the next one. Attempts for a single message are sequential.

use async_trait::async_trait;
use event_bus::consumer_retry::{retry_if, RetryConfig};
use event_bus::{envelope, BusMessage, BusResult, EventBus, EventEnvelope};
use failure_policy::{classify, CallRole, Disposition, Failure};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::dead_letter::{self, DeadLetter, DeadLetterReason};

/// Downstream side effect applied to each decoded event
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Short name used in logs and DLQ headers
    fn name(&self) -> &'static str;

    /// The `event_type` this handler accepts; anything else is dropped as poison
    fn event_type(&self) -> &'static str;

    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), Failure>;
}

#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Subject or pattern to subscribe to
    pub subject: String,
    /// Where exhausted messages are forwarded
    pub dlq_subject: String,
    pub retry: RetryConfig,
    /// Upper bound on messages processed concurrently
    pub max_in_flight: usize,
}

impl SubscriberConfig {
    pub fn new(subject: impl Into<String>, dlq_subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            dlq_subject: dlq_subject.into(),
            retry: RetryConfig::default(),
            max_in_flight: 64,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }
}

/// Terminal state reached by one message
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    /// The effect succeeded on attempt `attempts`
    Delivered { attempts: u32 },
    /// Undecodable or not meant for this handler; nothing was attempted
    Dropped { reason: String },
    /// Forwarded to the DLQ subject
    DeadLettered {
        attempts: u32,
        reason: DeadLetterReason,
    },
    /// The effect failed and the DLQ publish failed too
    DeadLetterFailed { attempts: u32, error: String },
}

pub struct RetryingSubscriber {
    bus: Arc<dyn EventBus>,
    handler: Arc<dyn EventHandler>,
    config: SubscriberConfig,
}

impl RetryingSubscriber {
    pub fn new(
        bus: Arc<dyn EventBus>,
        handler: Arc<dyn EventHandler>,
        config: SubscriberConfig,
    ) -> Self {
        Self {
            bus,
            handler,
            config,
        }
    }

    pub fn config(&self) -> &SubscriberConfig {
        &self.config
    }

    /// Subscribe and process messages in the background
    ///
    /// Subscription errors are returned to the caller; once subscribed, the
    /// loop runs until the bus closes the stream.
    pub async fn start(self) -> BusResult<JoinHandle<()>> {
        let mut stream = self.bus.subscribe(&self.config.subject).await?;

        tracing::info!(
            subject = %self.config.subject,
            handler = self.handler.name(),
            dlq_subject = %self.config.dlq_subject,
            "Subscribed"
        );

        let limiter = Arc::new(Semaphore::new(self.config.max_in_flight.max(1)));
        let subscriber = Arc::new(self);

        Ok(tokio::spawn(async move {
            while let Some(msg) = stream.next().await {
                let Ok(permit) = limiter.clone().acquire_owned().await else {
                    break;
                };
                let subscriber = subscriber.clone();

                tokio::spawn(async move {
                    let _permit = permit;
                    subscriber.process_message(&msg).await;
                });
            }

            tracing::warn!(
                subject = %subscriber.config.subject,
                handler = subscriber.handler.name(),
                "Consumer stopped"
            );
        }))
    }

    /// Drive one message through decode, attempts and dead-lettering
    pub async fn process_message(&self, msg: &BusMessage) -> DeliveryOutcome {
        let span = tracing::info_span!(
            "deliver",
            subject = %msg.subject,
            handler = self.handler.name()
        );

        self.process_inner(msg).instrument(span).await
    }

    async fn process_inner(&self, msg: &BusMessage) -> DeliveryOutcome {
        let envelope = match self.decode(msg) {
            Ok(envelope) => envelope,
            Err(failure) => {
                // Poison: retrying or dead-lettering cannot make it decodable
                tracing::error!(error = %failure, "Dropping undecodable message");
                return DeliveryOutcome::Dropped {
                    reason: failure.to_string(),
                };
            }
        };

        let handler: &dyn EventHandler = self.handler.as_ref();
        let envelope_ref = &envelope;
        let mut attempts = 0;

        let result = retry_if(
            |attempt| {
                attempts = attempt;
                handler.handle(envelope_ref)
            },
            &self.config.retry,
            handler.name(),
            |failure| classify(failure, CallRole::Delivery) == Disposition::Retryable,
        )
        .await;

        let exhausted = match result {
            Ok(()) => {
                tracing::info!(
                    event_type = envelope.event_type(),
                    event_id = ?envelope.event_id,
                    attempts = attempts,
                    "Event delivered"
                );
                return DeliveryOutcome::Delivered { attempts };
            }
            Err(exhausted) => exhausted,
        };

        let reason = if exhausted.gave_up {
            DeadLetterReason::NonRetryable
        } else {
            DeadLetterReason::RetriesExhausted
        };
        let last_error = exhausted.last_error.to_string();
        let dead_letter = DeadLetter {
            handler: handler.name(),
            attempts: exhausted.attempts,
            reason,
            last_error: &last_error,
        };

        match dead_letter::forward(
            self.bus.as_ref(),
            &self.config.dlq_subject,
            msg,
            &dead_letter,
        )
        .await
        {
            Ok(()) => {
                tracing::error!(
                    event_type = envelope.event_type(),
                    event_id = ?envelope.event_id,
                    attempts = exhausted.attempts,
                    reason = reason.as_str(),
                    error = %last_error,
                    dlq_subject = %self.config.dlq_subject,
                    "Event moved to DLQ"
                );
                DeliveryOutcome::DeadLettered {
                    attempts: exhausted.attempts,
                    reason,
                }
            }
            Err(dlq_err) => {
                tracing::error!(
                    event_type = envelope.event_type(),
                    event_id = ?envelope.event_id,
                    attempts = exhausted.attempts,
                    error = %last_error,
                    dlq_error = %dlq_err,
                    "Failed to publish to DLQ - event may be lost!"
                );
                DeliveryOutcome::DeadLetterFailed {
                    attempts: exhausted.attempts,
                    error: dlq_err.to_string(),
                }
            }
        }
    }

    fn decode(&self, msg: &BusMessage) -> Result<EventEnvelope, Failure> {
        let envelope =
            envelope::decode(&msg.payload).map_err(|e| Failure::Decode(e.to_string()))?;

        if envelope.event_type() != self.handler.event_type() {
            return Err(Failure::Decode(format!(
                "unexpected event_type '{}' on {}, handler accepts '{}'",
                envelope.event_type(),
                msg.subject,
                self.handler.event_type()
            )));
        }

        Ok(envelope)
    }
}
