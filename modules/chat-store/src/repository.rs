use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    /// Event id from the envelope; `None` for unstamped legacy events
    pub message_id: Option<Uuid>,
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    /// A row with the same message id already exists
    Duplicate,
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn save_message(&self, message: &ChatMessage) -> Result<SaveOutcome, RepositoryError>;
}

pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn save_message(&self, message: &ChatMessage) -> Result<SaveOutcome, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO chat_messages (message_id, session_id, user_id, user_name, content)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (message_id) DO NOTHING
            "#,
        )
        .bind(message.message_id)
        .bind(message.session_id)
        .bind(message.user_id)
        .bind(&message.user_name)
        .bind(&message.content)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(SaveOutcome::Duplicate)
        } else {
            Ok(SaveOutcome::Inserted)
        }
    }
}

/// Process-local repository with the same dedup rule as the table
#[derive(Default)]
pub struct InMemoryChatRepository {
    state: Mutex<InMemoryState>,
}

#[derive(Default)]
struct InMemoryState {
    seen: HashSet<Uuid>,
    messages: Vec<ChatMessage>,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state
            .lock()
            .map(|state| state.messages.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn save_message(&self, message: &ChatMessage) -> Result<SaveOutcome, RepositoryError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;

        if let Some(id) = message.message_id {
            if !state.seen.insert(id) {
                return Ok(SaveOutcome::Duplicate);
            }
        }

        state.messages.push(message.clone());
        Ok(SaveOutcome::Inserted)
    }
}
