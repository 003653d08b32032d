//! # EventBus Abstraction
//!
//! Subject-based publish/subscribe shared by every service that emits or
//! consumes session events.
//!
//! ## Delivery model
//!
//! - At-least-once from the subscriber's point of view; duplicates are possible.
//! - No ordering guarantee across subjects, and none across messages once a
//!   consumer processes them concurrently.
//! - One long-lived bus handle is built at process start (see [`connect`]) and
//!   passed as `Arc<dyn EventBus>` to every publisher and subscriber.
//!
//! ## Implementations
//!
//! - **NatsBus**: production implementation over core NATS
//! - **InMemoryBus**: test/dev implementation using in-memory channels
//!
//! ## Usage
//!
//! ```rust,no_run
//! use event_bus::{EventBus, EventPublisher, InMemoryBus};
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bus: Arc<dyn EventBus> = Arc::new(InMemoryBus::new());
//! let publisher = EventPublisher::new(bus.clone());
//!
//! let mut stream = bus.subscribe("session.joined").await?;
//! publisher.session_joined(Uuid::new_v4(), Uuid::new_v4()).await?;
//!
//! while let Some(msg) = futures::StreamExt::next(&mut stream).await {
//!     println!("Received: {} bytes on {}", msg.payload.len(), msg.subject);
//! }
//! # Ok(())
//! # }
//! ```

pub mod consumer_retry;
mod connect;
pub mod envelope;
mod inmemory_bus;
mod nats_bus;
pub mod publisher;

pub use connect::{connect, BusType};
pub use envelope::{DomainEvent, EnvelopeError, EventEnvelope};
pub use inmemory_bus::InMemoryBus;
pub use nats_bus::NatsBus;
pub use publisher::{EventPublisher, PublishError};

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::HashMap;
use std::fmt;

/// Subject names shared by publishers and subscribers.
///
/// These are wire contracts: renaming one breaks every deployed consumer.
pub mod subjects {
    pub const SESSION_CREATED: &str = "session.created";
    pub const SESSION_JOINED: &str = "session.joined";
    /// Prefix of the per-session chat subjects (`chat.message.received.<session_id>`)
    pub const CHAT_MESSAGE_RECEIVED_PREFIX: &str = "chat.message.received";
    /// Consumer-side pattern matching every chat session
    pub const CHAT_MESSAGE_RECEIVED_ALL: &str = "chat.message.received.*";
    /// Dead-letter subject for chat messages that could not be persisted
    pub const CHAT_MESSAGE_FAILED: &str = "chat.message.failed";
    /// Dead-letter subject for join notifications that could not be delivered
    pub const SESSION_JOINED_FAILED: &str = "session.joined.failed";
}

/// A message received from the event bus
#[derive(Debug, Clone)]
pub struct BusMessage {
    /// The subject/topic this message was published to
    pub subject: String,
    /// The message payload (raw bytes)
    pub payload: Vec<u8>,
    /// Optional headers (dead-letter metadata travels here)
    pub headers: Option<HashMap<String, String>>,
    /// Optional reply-to subject (for request-response patterns)
    pub reply_to: Option<String>,
}

impl BusMessage {
    /// Create a new bus message
    pub fn new(subject: String, payload: Vec<u8>) -> Self {
        Self {
            subject,
            payload,
            headers: None,
            reply_to: None,
        }
    }

    /// Add headers to the message
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Add a reply-to subject
    pub fn with_reply_to(mut self, reply_to: String) -> Self {
        self.reply_to = Some(reply_to);
        self
    }

    /// Look up a single header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()
            .and_then(|h| h.get(name))
            .map(String::as_str)
    }
}

/// Errors that can occur when using the event bus
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("failed to publish message: {0}")]
    PublishError(String),

    #[error("failed to subscribe to subject: {0}")]
    SubscribeError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),
}

/// Result type for event bus operations
pub type BusResult<T> = Result<T, BusError>;

/// Core event bus abstraction for publish-subscribe messaging
///
/// Implementations must be safe to share across tasks; the transport is
/// responsible for serializing concurrent sends.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish a message to a subject
    ///
    /// # Arguments
    /// * `subject` - The subject/topic to publish to (e.g., "session.joined")
    /// * `payload` - The message payload as raw bytes
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> BusResult<()>;

    /// Publish a message carrying headers
    ///
    /// The payload is delivered untouched; headers are side-band metadata.
    async fn publish_with_headers(
        &self,
        subject: &str,
        headers: HashMap<String, String>,
        payload: Vec<u8>,
    ) -> BusResult<()>;

    /// Subscribe to messages matching a subject pattern
    ///
    /// # Arguments
    /// * `subject` - The subject pattern to subscribe to (supports wildcards: `*`, `>`)
    ///   - `*` matches a single token (e.g., `chat.message.received.*`)
    ///   - `>` matches one or more tokens (e.g., `session.>`)
    ///
    /// # Example
    /// ```rust,no_run
    /// # use event_bus::{EventBus, InMemoryBus};
    /// # use futures::StreamExt;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let bus = InMemoryBus::new();
    /// let mut stream = bus.subscribe("chat.message.received.*").await?;
    /// while let Some(msg) = stream.next().await {
    ///     // Process message
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn subscribe(&self, subject: &str) -> BusResult<BoxStream<'static, BusMessage>>;
}

impl fmt::Debug for dyn EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventBus")
    }
}
