//! Dead-letter forwarding
//!
//! The original message bytes are republished verbatim so existing DLQ
//! consumers keep working. What went wrong travels in headers only.

use chrono::Utc;
use event_bus::{BusMessage, EventBus};
use std::collections::HashMap;

pub const HEADER_ORIGINAL_SUBJECT: &str = "Dlq-Original-Subject";
pub const HEADER_HANDLER: &str = "Dlq-Handler";
pub const HEADER_ATTEMPTS: &str = "Dlq-Attempts";
pub const HEADER_REASON: &str = "Dlq-Reason";
pub const HEADER_LAST_ERROR: &str = "Dlq-Last-Error";
pub const HEADER_FAILED_AT: &str = "Dlq-Failed-At";

/// Why a message was dead-lettered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadLetterReason {
    /// Every attempt failed with a retryable error
    RetriesExhausted,
    /// The effect failed in a way retrying cannot fix
    NonRetryable,
}

impl DeadLetterReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeadLetterReason::RetriesExhausted => "retries_exhausted",
            DeadLetterReason::NonRetryable => "non_retryable",
        }
    }
}

/// Attempt context attached to a dead-lettered message
#[derive(Debug, Clone)]
pub struct DeadLetter<'a> {
    pub handler: &'static str,
    pub attempts: u32,
    pub reason: DeadLetterReason,
    pub last_error: &'a str,
}

impl DeadLetter<'_> {
    pub fn headers(&self, original: &BusMessage) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert(HEADER_ORIGINAL_SUBJECT.to_string(), original.subject.clone());
        headers.insert(HEADER_HANDLER.to_string(), self.handler.to_string());
        headers.insert(HEADER_ATTEMPTS.to_string(), self.attempts.to_string());
        headers.insert(HEADER_REASON.to_string(), self.reason.as_str().to_string());
        headers.insert(HEADER_LAST_ERROR.to_string(), self.last_error.to_string());
        headers.insert(HEADER_FAILED_AT.to_string(), Utc::now().to_rfc3339());
        headers
    }
}

/// Republish the original bytes to the DLQ subject
///
/// Best effort: the caller logs a failure here and moves on.
pub async fn forward(
    bus: &dyn EventBus,
    dlq_subject: &str,
    original: &BusMessage,
    dead_letter: &DeadLetter<'_>,
) -> Result<(), event_bus::BusError> {
    bus.publish_with_headers(
        dlq_subject,
        dead_letter.headers(original),
        original.payload.clone(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_carry_attempt_context() {
        let original = BusMessage::new("chat.message.received.s1".to_string(), b"{}".to_vec());
        let dead_letter = DeadLetter {
            handler: "chat_persistence",
            attempts: 3,
            reason: DeadLetterReason::RetriesExhausted,
            last_error: "downstream effect failed: pool timed out",
        };

        let headers = dead_letter.headers(&original);

        assert_eq!(headers[HEADER_ORIGINAL_SUBJECT], "chat.message.received.s1");
        assert_eq!(headers[HEADER_ATTEMPTS], "3");
        assert_eq!(headers[HEADER_REASON], "retries_exhausted");
        assert!(headers.contains_key(HEADER_FAILED_AT));
    }
}
