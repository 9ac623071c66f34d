//! Transcript Store — per-session chat history held in Redis.
//!
//! Each training session owns an append-only list of role-tagged turns under
//! `user:{user_id}:session:{session_id}`. An absent or empty list is a normal
//! "no data" response, not an error; callers decide what emptiness means.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt stored record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The salesperson in training.
    User,
    /// The simulated buyer persona.
    Assistant,
}

/// A single chat turn. Position in the transcript is implicit (list index);
/// turns are never rewritten once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub role: Role,
    pub content: String,
}

impl TranscriptTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Full ordered transcript for a session. Empty Vec when nothing exists.
    async fn get_turns(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<Vec<TranscriptTurn>, StoreError>;

    async fn append_turn(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        turn: &TranscriptTurn,
    ) -> Result<(), StoreError>;
}

pub struct RedisTranscriptStore {
    client: redis::Client,
}

impl RedisTranscriptStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn key(user_id: Uuid, session_id: Uuid) -> String {
        format!("user:{user_id}:session:{session_id}")
    }
}

#[async_trait]
impl TranscriptStore for RedisTranscriptStore {
    async fn get_turns(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<Vec<TranscriptTurn>, StoreError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let raw: Vec<String> = con.lrange(Self::key(user_id, session_id), 0, -1).await?;
        raw.iter()
            .map(|item| serde_json::from_str(item).map_err(StoreError::from))
            .collect()
    }

    async fn append_turn(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        turn: &TranscriptTurn,
    ) -> Result<(), StoreError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(turn)?;
        let _: () = con.rpush(Self::key(user_id, session_id), payload).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_snake_case() {
        let turn = TranscriptTurn::new(Role::Assistant, "Tell me about lead times.");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"role\":\"assistant\""));

        let back: TranscriptTurn = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role, Role::Assistant);
        assert_eq!(back.content, "Tell me about lead times.");
    }

    #[test]
    fn test_key_scopes_by_user_and_session() {
        let user = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_ne!(
            RedisTranscriptStore::key(user, a),
            RedisTranscriptStore::key(user, b)
        );
    }
}
