pub mod config;
pub mod handler;
pub mod health;
pub mod repository;

use event_bus::{subjects, BusResult, EventBus};
use event_consumer::{RetryingSubscriber, SubscriberConfig};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub use handler::ChatPersistenceHandler;

/// Start the chat persistence consumer on every session's chat subject
///
/// Exhausted messages land on `chat.message.failed`.
pub async fn start_chat_consumer(
    bus: Arc<dyn EventBus>,
    handler: Arc<ChatPersistenceHandler>,
    config: &config::Config,
) -> BusResult<JoinHandle<()>> {
    let subscriber_config = SubscriberConfig::new(
        subjects::CHAT_MESSAGE_RECEIVED_ALL,
        subjects::CHAT_MESSAGE_FAILED,
    )
    .with_retry(config.retry.clone())
    .with_max_in_flight(config.max_in_flight);

    RetryingSubscriber::new(bus, handler, subscriber_config)
        .start()
        .await
}
