use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One training session: a user practicing against one AI persona.
/// The chat transcript itself lives in Redis, keyed by (user_id, session id);
/// this row only carries ownership and display metadata.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub persona_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}
