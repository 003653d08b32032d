//! Device token lookup

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("token store unavailable: {0}")]
    Unavailable(String),
}

/// Source of the push tokens registered for a user
#[async_trait]
pub trait DeviceTokenStore: Send + Sync {
    async fn device_tokens(&self, user_id: Uuid) -> Result<Vec<String>, TokenStoreError>;
}

/// Reads `user_device_tokens`, which the account service owns and migrates
pub struct PgDeviceTokenStore {
    pool: PgPool,
}

impl PgDeviceTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceTokenStore for PgDeviceTokenStore {
    async fn device_tokens(&self, user_id: Uuid) -> Result<Vec<String>, TokenStoreError> {
        let tokens: Vec<String> =
            sqlx::query_scalar("SELECT device_token FROM user_device_tokens WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(tokens)
    }
}

/// Token store kept in process memory; used by tests and local runs
#[derive(Default)]
pub struct InMemoryDeviceTokenStore {
    tokens: RwLock<HashMap<Uuid, Vec<String>>>,
}

impl InMemoryDeviceTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, user_id: Uuid, device_token: impl Into<String>) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.entry(user_id).or_default().push(device_token.into());
        }
    }
}

#[async_trait]
impl DeviceTokenStore for InMemoryDeviceTokenStore {
    async fn device_tokens(&self, user_id: Uuid) -> Result<Vec<String>, TokenStoreError> {
        let tokens = self
            .tokens
            .read()
            .map_err(|e| TokenStoreError::Unavailable(e.to_string()))?;

        Ok(tokens.get(&user_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_returns_registered_tokens() {
        let store = InMemoryDeviceTokenStore::new();
        let user = Uuid::new_v4();
        store.register(user, "token-a");
        store.register(user, "token-b");

        let tokens = store.device_tokens(user).await.unwrap();
        assert_eq!(tokens, vec!["token-a".to_string(), "token-b".to_string()]);

        assert!(store.device_tokens(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires DATABASE_URL pointing at a database with user_device_tokens
    async fn test_pg_store_reads_tokens() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .expect("connect");

        let store = PgDeviceTokenStore::new(pool);
        let tokens = store.device_tokens(Uuid::new_v4()).await.unwrap();
        assert!(tokens.is_empty());
    }
}
