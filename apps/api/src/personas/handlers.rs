use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::persona::PersonaRow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreatePersonaRequest {
    pub name: String,
    pub system_prompt: String,
}

/// POST /api/v1/personas
pub async fn handle_create_persona(
    State(state): State<AppState>,
    Json(req): Json<CreatePersonaRequest>,
) -> Result<Json<PersonaRow>, AppError> {
    if req.name.trim().is_empty() || req.system_prompt.trim().is_empty() {
        return Err(AppError::Validation(
            "name and system_prompt must not be empty".to_string(),
        ));
    }
    let persona = super::create_persona(&state.db, &req.name, &req.system_prompt).await?;
    Ok(Json(persona))
}

/// GET /api/v1/personas
pub async fn handle_list_personas(
    State(state): State<AppState>,
) -> Result<Json<Vec<PersonaRow>>, AppError> {
    let personas = super::list_personas(&state.db).await?;
    Ok(Json(personas))
}

/// GET /api/v1/personas/:id
pub async fn handle_get_persona(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PersonaRow>, AppError> {
    let persona = super::get_persona(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Persona {id} not found")))?;
    Ok(Json(persona))
}
