//! # Event consumer
//!
//! Consumer-side half of the event pipeline. A service supplies an
//! [`EventHandler`] (its downstream effect) and a [`SubscriberConfig`]; the
//! [`RetryingSubscriber`] owns decoding, bounded retries with backoff and
//! dead-letter forwarding.
//!
//! ```rust,no_run
//! use event_bus::{subjects, EventBus, InMemoryBus};
//! use event_consumer::{RetryingSubscriber, SubscriberConfig};
//! # use event_consumer::EventHandler;
//! use std::sync::Arc;
//!
//! # async fn example(handler: Arc<dyn EventHandler>) -> Result<(), Box<dyn std::error::Error>> {
//! let bus: Arc<dyn EventBus> = Arc::new(InMemoryBus::new());
//! let config = SubscriberConfig::new(
//!     subjects::CHAT_MESSAGE_RECEIVED_ALL,
//!     subjects::CHAT_MESSAGE_FAILED,
//! );
//! let task = RetryingSubscriber::new(bus, handler, config).start().await?;
//! # task.abort();
//! # Ok(())
//! # }
//! ```

pub mod dead_letter;
mod subscriber;

pub use dead_letter::DeadLetterReason;
pub use subscriber::{DeliveryOutcome, EventHandler, RetryingSubscriber, SubscriberConfig};

pub use failure_policy::Failure;
