//! Session-details gateway
//!
//! Serves `GET /v1/session-details/{id}` by joining the session service's
//! session with the user service's coach profile.

pub mod aggregator;
pub mod avatar;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod upstream;

use std::sync::Arc;

pub use aggregator::SessionDetailsAggregator;
pub use error::AggregateError;

use avatar::AvatarRewriter;
use upstream::{HttpProfileSource, HttpSessionSource, UpstreamClient};

/// Wire the HTTP upstream sources described by `config` into an aggregator
pub fn build_aggregator(config: &config::Config) -> Result<SessionDetailsAggregator, reqwest::Error> {
    let sessions = UpstreamClient::new(
        config.auth_service_url.as_str(),
        config.internal_secret.clone(),
        config.upstream_timeout,
    )?;
    let profiles = UpstreamClient::new(
        config.user_service_url.as_str(),
        config.internal_secret.clone(),
        config.upstream_timeout,
    )?;

    Ok(SessionDetailsAggregator::new(
        Arc::new(HttpSessionSource::new(sessions)),
        Arc::new(HttpProfileSource::new(profiles)),
        config.upstream_timeout,
        AvatarRewriter::new(
            config.avatar_internal_prefix.as_str(),
            config.public_base_url.as_str(),
        ),
    ))
}
