//! # Failure policy
//!
//! One classification shared by the event consumers and the gateway
//! aggregator, so "what is worth retrying" and "what may be degraded" are
//! decided in a single place.
//!
//! | Failure                              | Delivery  | Primary | Secondary  |
//! |--------------------------------------|-----------|---------|------------|
//! | Connection, Timeout, 5xx, Downstream | Retryable | Fatal   | Degradable |
//! | NotFound                             | Fatal     | Fatal   | Degradable |
//! | Decode                               | Fatal     | Fatal   | Degradable |
//! | Rejected, other 4xx                  | Fatal     | Fatal   | Fatal      |
//! | 401 / 403                            | Fatal     | Fatal   | Fatal      |
//!
//! Decode failures are never retried in any role. In the secondary role they
//! are absorbed like any other degraded lookup. A secondary that rejects the
//! request itself (4xx other than 404) is a bug on our side, not an outage,
//! and is surfaced.

use std::time::Duration;

/// A failure observed while calling a dependency or applying a side effect
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    /// Transport-level failure: refused, reset, DNS, broker down
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("not found")]
    NotFound,

    /// Non-success HTTP status other than 404
    #[error("upstream returned status {0}")]
    Status(u16),

    /// Payload could not be parsed; permanent for that payload
    #[error("decode failed: {0}")]
    Decode(String),

    /// A downstream store or provider failed the effect; may succeed later
    #[error("downstream effect failed: {0}")]
    Downstream(String),

    /// A downstream permanently refused the effect; retrying cannot help
    #[error("downstream rejected the effect: {0}")]
    Rejected(String),
}

impl Failure {
    /// Map a non-success HTTP status to a failure
    pub fn from_status(status: u16) -> Self {
        if status == 404 {
            Failure::NotFound
        } else {
            Failure::Status(status)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Failure::NotFound)
    }

    /// The dependency is (temporarily) unable to serve us
    pub fn is_unavailable(&self) -> bool {
        match self {
            Failure::Connection(_) | Failure::Timeout(_) | Failure::Downstream(_) => true,
            Failure::Status(code) => *code >= 500,
            Failure::NotFound | Failure::Decode(_) | Failure::Rejected(_) => false,
        }
    }

    /// The dependency refused our credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Failure::Status(401) | Failure::Status(403))
    }

    /// The dependency rejected the request itself (4xx other than 404)
    pub fn is_rejected(&self) -> bool {
        match self {
            Failure::Rejected(_) => true,
            Failure::Status(code) => (400..500).contains(code),
            _ => false,
        }
    }
}

/// Where the failing call sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallRole {
    /// A subscriber applying a side effect for one message
    Delivery,
    /// A lookup the response cannot be built without
    Primary,
    /// A lookup whose absence only degrades the response
    Secondary,
}

/// What the caller should do about a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Stop; surface or dead-letter
    Fatal,
    /// Try the same call again after backoff
    Retryable,
    /// Continue with a placeholder
    Degradable,
}

/// Classify a failure for the role it occurred in
pub fn classify(failure: &Failure, role: CallRole) -> Disposition {
    match role {
        CallRole::Delivery => {
            if failure.is_unavailable() {
                Disposition::Retryable
            } else {
                Disposition::Fatal
            }
        }
        CallRole::Primary => Disposition::Fatal,
        CallRole::Secondary => {
            if failure.is_rejected() {
                Disposition::Fatal
            } else {
                Disposition::Degradable
            }
        }
    }
}
