use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use notification_worker_rs::{
    config::Config,
    health,
    push::MockPushSender,
    start_notification_consumer,
    tokens::PgDeviceTokenStore,
    SessionJoinedNotifier,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        bus_type = ?config.bus_type,
        "Starting notification worker"
    );

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    let bus = event_bus::connect(config.bus_type, &config.nats_url).await?;

    if config.apns_topic.is_none() {
        tracing::warn!("APNS_TOPIC not set; pushes are logged only");
    }
    let notifier = Arc::new(SessionJoinedNotifier::new(
        Arc::new(PgDeviceTokenStore::new(pool)),
        Arc::new(MockPushSender::new()),
        config.apns_topic.clone(),
    ));

    let consumer = start_notification_consumer(bus, notifier, &config).await?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Notification worker listening on {}", addr);

    axum::serve(listener, health::router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    consumer.abort();
    tracing::info!("Notification worker stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
