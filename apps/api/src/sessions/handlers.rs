use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::SessionRow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: Uuid,
    pub persona_id: Uuid,
    pub title: String,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<SessionRow>, AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }
    let session = super::create_session(&state.db, req.user_id, req.persona_id, &req.title).await?;
    Ok(Json(session))
}

/// GET /api/v1/sessions
pub async fn handle_list_sessions(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<SessionRow>>, AppError> {
    let sessions = super::list_sessions(&state.db, params.user_id).await?;
    Ok(Json(sessions))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SessionRow>, AppError> {
    let session = super::require_session(&state.db, session_id, params.user_id).await?;
    Ok(Json(session))
}

/// DELETE /api/v1/sessions/:id
///
/// Also stops any coaching monitor still attached to the session; the
/// transcript and feedback history in Redis are left to their TTLs.
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let deleted = super::delete_session(&state.db, session_id, params.user_id).await?;
    if !deleted {
        return Err(AppError::NotFound(
            "Session not found or does not belong to you".to_string(),
        ));
    }
    // Best effort: a monitor may or may not be running.
    let _ = state.coaching.stop(params.user_id, session_id);
    Ok(StatusCode::NO_CONTENT)
}
