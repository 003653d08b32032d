//! Upstream lookups used by the session-details aggregator
//!
//! Every outcome other than a decoded body is reported as a [`Failure`], so
//! the aggregator can classify it without knowing about HTTP.

use async_trait::async_trait;
use failure_policy::Failure;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use uuid::Uuid;

use crate::models::{CoachProfileData, SessionData};

pub const INTERNAL_SECRET_HEADER: &str = "X-Internal-Secret";

/// Primary lookup: the session itself
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn get_session(&self, session_id: Uuid) -> Result<SessionData, Failure>;
}

/// Secondary lookup: the coach profile
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> Result<CoachProfileData, Failure>;
}

/// Shared HTTP plumbing for one upstream service
#[derive(Clone)]
pub struct UpstreamClient {
    http_client: Client,
    base_url: String,
    internal_secret: Option<String>,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(
        base_url: impl Into<String>,
        internal_secret: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            internal_secret,
            timeout,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Failure> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http_client.get(&url);
        if let Some(secret) = &self.internal_secret {
            request = request.header(INTERNAL_SECRET_HEADER, secret);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;

        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, Failure> {
        let status = response.status();

        if !status.is_success() {
            return Err(Failure::from_status(status.as_u16()));
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                Failure::Decode(e.to_string())
            } else {
                self.transport_failure(e)
            }
        })
    }

    fn transport_failure(&self, e: reqwest::Error) -> Failure {
        if e.is_timeout() {
            Failure::Timeout(self.timeout)
        } else {
            Failure::Connection(e.to_string())
        }
    }
}

/// `GET {AUTH_SERVICE_URL}/v1/sessions/{id}`
pub struct HttpSessionSource {
    client: UpstreamClient,
}

impl HttpSessionSource {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionSource for HttpSessionSource {
    async fn get_session(&self, session_id: Uuid) -> Result<SessionData, Failure> {
        self.client
            .get_json(&format!("/v1/sessions/{}", session_id))
            .await
    }
}

/// `GET {USER_SERVICE_URL}/v1/users/{id}`
pub struct HttpProfileSource {
    client: UpstreamClient,
}

impl HttpProfileSource {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProfileSource for HttpProfileSource {
    async fn get_profile(&self, user_id: Uuid) -> Result<CoachProfileData, Failure> {
        self.client.get_json(&format!("/v1/users/{}", user_id)).await
    }
}
