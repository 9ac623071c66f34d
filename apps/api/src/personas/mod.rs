//! AI buyer personas — minimal CRUD over the persona briefs used by chat.

pub mod handlers;

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::persona::PersonaRow;

pub async fn get_persona(pool: &PgPool, id: Uuid) -> Result<Option<PersonaRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM ai_personas WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_persona(
    pool: &PgPool,
    name: &str,
    system_prompt: &str,
) -> Result<PersonaRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO ai_personas (id, name, system_prompt, created_at)
        VALUES ($1, $2, $3, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(system_prompt)
    .fetch_one(pool)
    .await
}

pub async fn list_personas(pool: &PgPool) -> Result<Vec<PersonaRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM ai_personas ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}
