pub mod config;
pub mod handler;
pub mod health;
pub mod push;
pub mod tokens;

use event_bus::{subjects, BusResult, EventBus};
use event_consumer::{RetryingSubscriber, SubscriberConfig};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub use handler::SessionJoinedNotifier;

/// Start the `session.joined` consumer
///
/// Exhausted events land on `session.joined.failed`.
pub async fn start_notification_consumer(
    bus: Arc<dyn EventBus>,
    notifier: Arc<SessionJoinedNotifier>,
    config: &config::Config,
) -> BusResult<JoinHandle<()>> {
    let subscriber_config =
        SubscriberConfig::new(subjects::SESSION_JOINED, subjects::SESSION_JOINED_FAILED)
            .with_retry(config.retry.clone())
            .with_max_in_flight(config.max_in_flight);

    RetryingSubscriber::new(bus, notifier, subscriber_config)
        .start()
        .await
}
