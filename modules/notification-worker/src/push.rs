//! Push delivery
//!
//! Only the logging sender ships here. A provider-backed sender plugs in
//! behind the same trait.

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const SESSION_JOINED_ALERT: &str = "You have joined a new session!";

/// One push addressed to one device
#[derive(Debug, Clone, PartialEq)]
pub struct PushNotification {
    pub device_token: String,
    pub topic: Option<String>,
    pub payload: serde_json::Value,
}

impl PushNotification {
    /// APNs-style alert payload
    pub fn alert(device_token: impl Into<String>, topic: Option<String>, alert: &str) -> Self {
        Self {
            device_token: device_token.into(),
            topic,
            payload: json!({ "aps": { "alert": alert, "sound": "default" } }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("push rejected: {0}")]
    Rejected(String),

    #[error("push provider unreachable: {0}")]
    Transport(String),
}

#[async_trait]
pub trait PushSender: Send + Sync {
    /// Returns the provider's message id
    async fn push(&self, notification: &PushNotification) -> Result<String, PushError>;
}

/// Logs each push instead of contacting a provider
#[derive(Debug, Default)]
pub struct MockPushSender {
    sent: AtomicUsize,
}

impl MockPushSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushSender for MockPushSender {
    async fn push(&self, notification: &PushNotification) -> Result<String, PushError> {
        let n = self.sent.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::info!(
            device_token = %notification.device_token,
            topic = ?notification.topic,
            "Mock: push notification sent"
        );

        Ok(format!("mock-push-{}", n))
    }
}
