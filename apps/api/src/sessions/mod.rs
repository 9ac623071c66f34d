//! Training sessions — minimal CRUD plus the ownership predicate every
//! coaching and chat handler consults before touching a session.

pub mod handlers;

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::SessionRow;

/// Ownership check: the session must exist and belong to the caller.
/// A session owned by someone else is indistinguishable from a missing one.
pub async fn require_session(
    pool: &PgPool,
    session_id: Uuid,
    user_id: Uuid,
) -> Result<SessionRow, AppError> {
    get_session_for_user(pool, session_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Session not found or does not belong to you".to_string()))
}

pub async fn get_session_for_user(
    pool: &PgPool,
    session_id: Uuid,
    user_id: Uuid,
) -> Result<Option<SessionRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM sessions WHERE id = $1 AND user_id = $2")
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn create_session(
    pool: &PgPool,
    user_id: Uuid,
    persona_id: Uuid,
    title: &str,
) -> Result<SessionRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO sessions (id, user_id, persona_id, title, created_at)
        VALUES ($1, $2, $3, $4, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(persona_id)
    .bind(title)
    .fetch_one(pool)
    .await
}

pub async fn list_sessions(pool: &PgPool, user_id: Uuid) -> Result<Vec<SessionRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM sessions WHERE user_id = $1 ORDER BY created_at DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Returns whether a row was actually deleted.
pub async fn delete_session(
    pool: &PgPool,
    session_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE id = $1 AND user_id = $2")
        .bind(session_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
