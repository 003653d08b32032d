use event_bus::consumer_retry::RetryConfig;
use event_bus::BusType;
use std::env;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Worker configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bus_type: BusType,
    pub nats_url: String,
    pub host: String,
    pub port: u16,
    pub retry: RetryConfig,
    pub max_in_flight: usize,
    /// Topic stamped on outgoing pushes; absent means mock delivery
    pub apns_topic: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bus_type = lookup("BUS_TYPE")
            .unwrap_or_else(|| "nats".to_string())
            .parse::<BusType>()
            .map_err(|reason| ConfigError::Invalid {
                key: "BUS_TYPE",
                reason,
            })?;

        let nats_url = lookup("NATS_URL").unwrap_or_else(|| "nats://localhost:4222".to_string());
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_or(&lookup, "PORT", 8091)?;

        let max_attempts: u32 = parse_or(&lookup, "RETRY_MAX_ATTEMPTS", 3)?;
        let backoff_ms: u64 = parse_or(&lookup, "RETRY_BACKOFF_MS", 2_000)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "RETRY_MAX_ATTEMPTS",
                reason: "must be at least 1".to_string(),
            });
        }

        let max_in_flight: usize = parse_or(&lookup, "MAX_IN_FLIGHT", 64)?;

        let apns_topic = lookup("APNS_TOPIC").filter(|topic| !topic.trim().is_empty());

        Ok(Config {
            database_url,
            bus_type,
            nats_url,
            host,
            port,
            retry: RetryConfig::fixed(max_attempts, Duration::from_millis(backoff_ms)),
            max_in_flight,
            apns_topic,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
