//! Feedback Store — durable per-session log of coaching notes.
//!
//! The whole history is persisted as one JSON blob per (user, session) with a
//! 24 h TTL that resets on every write. Entries are append-only: a note is
//! never mutated after creation, and each gets a per-session sequence id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transcript::StoreError;

/// Feedback histories are reclaimed by Redis this long after the last write.
pub const FEEDBACK_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// Produced by the background monitoring loop.
    AutoMonitoring,
    /// Produced by an explicit on-demand analysis request.
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// Sequence id scoped to this session's history, starting at 1.
    pub seq: u64,
    pub feedback: String,
    pub timestamp: DateTime<Utc>,
    /// Transcript length at the moment the note was generated. Non-decreasing
    /// across a session's ordered history.
    pub message_count_at_time: usize,
    pub trigger: TriggerType,
}

#[derive(Debug, Serialize, Deserialize)]
struct FeedbackHistory {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    entries: Vec<FeedbackEntry>,
}

impl FeedbackHistory {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            entries: Vec::new(),
        }
    }

    fn push(
        &mut self,
        feedback: &str,
        message_count: usize,
        trigger: TriggerType,
        now: DateTime<Utc>,
    ) -> FeedbackEntry {
        let seq = self.entries.last().map_or(1, |e| e.seq + 1);
        let entry = FeedbackEntry {
            seq,
            feedback: feedback.to_string(),
            timestamp: now,
            message_count_at_time: message_count,
            trigger,
        };
        self.entries.push(entry.clone());
        self.updated_at = now;
        entry
    }
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Appends one entry, initializing the history on first write. The TTL of
    /// the whole history resets on every append.
    async fn append(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        feedback: &str,
        message_count: usize,
        trigger: TriggerType,
    ) -> Result<FeedbackEntry, StoreError>;

    /// Ordered history for a session. Empty Vec when none exists — a missing
    /// history is not an error.
    async fn read_history(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<Vec<FeedbackEntry>, StoreError>;
}

pub struct RedisFeedbackStore {
    client: redis::Client,
}

impl RedisFeedbackStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn key(user_id: Uuid, session_id: Uuid) -> String {
        format!("coaching:feedback:{user_id}:{session_id}")
    }

    async fn load(
        &self,
        con: &mut redis::aio::MultiplexedConnection,
        key: &str,
    ) -> Result<Option<FeedbackHistory>, StoreError> {
        let raw: Option<String> = con.get(key).await?;
        match raw {
            Some(blob) => Ok(Some(serde_json::from_str(&blob)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl FeedbackStore for RedisFeedbackStore {
    async fn append(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        feedback: &str,
        message_count: usize,
        trigger: TriggerType,
    ) -> Result<FeedbackEntry, StoreError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let key = Self::key(user_id, session_id);
        let now = Utc::now();

        // Read-modify-write without a guard: last write wins. Writers per
        // session are the single monitor task plus the occasional manual
        // analysis request, so a concurrent append can at worst drop one
        // note or repeat a seq; acceptable for a 24 h coaching log.
        let mut history = self
            .load(&mut con, &key)
            .await?
            .unwrap_or_else(|| FeedbackHistory::new(now));
        let entry = history.push(feedback, message_count, trigger, now);

        let blob = serde_json::to_string(&history)?;
        let _: () = con.set_ex(&key, blob, FEEDBACK_TTL_SECS).await?;
        Ok(entry)
    }

    async fn read_history(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<Vec<FeedbackEntry>, StoreError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let key = Self::key(user_id, session_id);
        Ok(self
            .load(&mut con, &key)
            .await?
            .map(|h| h.entries)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_sequential_ids() {
        let t0 = Utc::now();
        let mut history = FeedbackHistory::new(t0);

        let first = history.push("open with a question", 3, TriggerType::AutoMonitoring, t0);
        let second = history.push("quantify the savings", 5, TriggerType::Manual, t0);

        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);
        assert_eq!(history.entries.len(), 2);
    }

    #[test]
    fn test_push_refreshes_updated_at_only() {
        let t0 = Utc::now();
        let mut history = FeedbackHistory::new(t0);
        let later = t0 + chrono::Duration::seconds(30);

        history.push("slow down", 4, TriggerType::AutoMonitoring, later);

        assert_eq!(history.created_at, t0);
        assert_eq!(history.updated_at, later);
    }

    #[test]
    fn test_push_continues_sequence_from_loaded_history() {
        // append() rebuilds the history from the stored blob before pushing,
        // so seq assignment must continue from whatever the blob holds.
        let blob = serde_json::json!({
            "created_at": "2026-08-01T00:00:00Z",
            "updated_at": "2026-08-01T00:05:00Z",
            "entries": [
                {
                    "seq": 1,
                    "feedback": "mirror their phrasing",
                    "timestamp": "2026-08-01T00:02:00Z",
                    "message_count_at_time": 4,
                    "trigger": "auto_monitoring"
                },
                {
                    "seq": 2,
                    "feedback": "name the next step",
                    "timestamp": "2026-08-01T00:05:00Z",
                    "message_count_at_time": 6,
                    "trigger": "manual"
                }
            ]
        })
        .to_string();

        let mut history: FeedbackHistory = serde_json::from_str(&blob).unwrap();
        let entry = history.push("close with a date", 8, TriggerType::AutoMonitoring, Utc::now());

        assert_eq!(entry.seq, 3);
        assert_eq!(history.entries.len(), 3);
    }

    #[test]
    fn test_history_blob_round_trips() {
        let now = Utc::now();
        let mut history = FeedbackHistory::new(now);
        history.push("ask about budget", 2, TriggerType::AutoMonitoring, now);

        let blob = serde_json::to_string(&history).unwrap();
        let back: FeedbackHistory = serde_json::from_str(&blob).unwrap();
        assert_eq!(back.entries.len(), 1);
        assert_eq!(back.entries[0].message_count_at_time, 2);
        assert_eq!(back.entries[0].trigger, TriggerType::AutoMonitoring);
    }
}
