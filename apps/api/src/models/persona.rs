use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// An AI buyer persona the trainee sells to. `system_prompt` is the full
/// character brief handed to the LLM as the system message.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PersonaRow {
    pub id: Uuid,
    pub name: String,
    pub system_prompt: String,
    pub created_at: DateTime<Utc>,
}
