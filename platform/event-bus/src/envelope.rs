//! # Event Envelope
//!
//! Wire shape of the session/chat domain events.
//!
//! ## Wire format
//!
//! One flat UTF-8 JSON object: a mandatory `event_type` tag next to the
//! event's own fields, plus an optional `event_id`:
//!
//! ```json
//! {
//!   "event_id": "7a0d6a8e-3b0e-4c55-9d7c-1a4f3f0f2b11",
//!   "event_type": "session.joined",
//!   "session_id": "0b8f3f4e-8f0a-4d8e-9a43-2d6f5d1c7e90",
//!   "user_id": "5e2b7c1d-6a3f-4b9e-8c0d-4f1a2b3c4d5e",
//!   "joined_at": "2025-03-01T10:00:00Z"
//! }
//! ```
//!
//! Decoding ignores unknown fields so producers can add fields without
//! breaking deployed consumers. A missing or unknown `event_type`, or a
//! missing required field, is a permanent decode failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::subjects;

/// Errors produced by the envelope codec
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("failed to encode envelope: {0}")]
    Encode(String),

    #[error("failed to decode envelope: {0}")]
    Decode(String),
}

/// Domain events carried between services
///
/// Each variant holds exactly the fields its consumers need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum DomainEvent {
    #[serde(rename = "session.created")]
    SessionCreated {
        session_id: Uuid,
        coach_id: Uuid,
        title: String,
        start_at: DateTime<Utc>,
    },

    #[serde(rename = "session.joined")]
    SessionJoined {
        session_id: Uuid,
        user_id: Uuid,
        joined_at: DateTime<Utc>,
    },

    #[serde(rename = "chat.message.received")]
    ChatMessageReceived {
        session_id: Uuid,
        user_id: Uuid,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_name: Option<String>,
    },
}

impl DomainEvent {
    pub const SESSION_CREATED: &'static str = "session.created";
    pub const SESSION_JOINED: &'static str = "session.joined";
    pub const CHAT_MESSAGE_RECEIVED: &'static str = "chat.message.received";

    /// The `event_type` tag written on the wire
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::SessionCreated { .. } => Self::SESSION_CREATED,
            DomainEvent::SessionJoined { .. } => Self::SESSION_JOINED,
            DomainEvent::ChatMessageReceived { .. } => Self::CHAT_MESSAGE_RECEIVED,
        }
    }

    /// Broker subject this event is published to
    ///
    /// Session events use one fixed subject per type. Chat messages carry the
    /// session id as a final token so consumers can subscribe with
    /// `chat.message.received.*`.
    pub fn subject(&self) -> String {
        match self {
            DomainEvent::SessionCreated { .. } => subjects::SESSION_CREATED.to_string(),
            DomainEvent::SessionJoined { .. } => subjects::SESSION_JOINED.to_string(),
            DomainEvent::ChatMessageReceived { session_id, .. } => {
                format!("{}.{}", subjects::CHAT_MESSAGE_RECEIVED_PREFIX, session_id)
            }
        }
    }

    /// Session the event belongs to
    pub fn session_id(&self) -> Uuid {
        match self {
            DomainEvent::SessionCreated { session_id, .. }
            | DomainEvent::SessionJoined { session_id, .. }
            | DomainEvent::ChatMessageReceived { session_id, .. } => *session_id,
        }
    }
}

/// A domain event plus its optional identity
///
/// `event_id` is stamped by [`crate::EventPublisher`]; envelopes from older
/// producers arrive without one and must still decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,

    #[serde(flatten)]
    pub event: DomainEvent,
}

impl EventEnvelope {
    /// Wrap an event with a freshly generated event id
    pub fn new(event: DomainEvent) -> Self {
        Self {
            event_id: Some(Uuid::new_v4()),
            event,
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }

    pub fn subject(&self) -> String {
        self.event.subject()
    }
}

impl From<DomainEvent> for EventEnvelope {
    fn from(event: DomainEvent) -> Self {
        Self {
            event_id: None,
            event,
        }
    }
}

/// Serialize an envelope to its JSON wire bytes
pub fn encode(envelope: &EventEnvelope) -> Result<Vec<u8>, EnvelopeError> {
    serde_json::to_vec(envelope).map_err(|e| EnvelopeError::Encode(e.to_string()))
}

/// Parse JSON wire bytes into an envelope
pub fn decode(bytes: &[u8]) -> Result<EventEnvelope, EnvelopeError> {
    serde_json::from_slice(bytes).map_err(|e| EnvelopeError::Decode(e.to_string()))
}
