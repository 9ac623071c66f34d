use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::personas;
use crate::sessions::require_session;
use crate::state::AppState;
use crate::transcript::{Role, TranscriptTurn};

#[derive(Deserialize)]
pub struct ChatRequest {
    pub user_id: Uuid,
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
    /// Transcript length after this exchange (trainee message + reply).
    pub message_count: usize,
}

/// POST /api/v1/chat/:session_id
pub async fn handle_chat(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let session = require_session(&state.db, session_id, req.user_id).await?;
    let persona = personas::get_persona(&state.db, session.persona_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Persona {} not found", session.persona_id))
        })?;

    let history = state.transcripts.get_turns(req.user_id, session_id).await?;
    let reply = crate::chat::respond(&state.llm, &persona, &history, &req.message).await?;

    // The trainee turn is only persisted once the persona has replied, so a
    // failed LLM call leaves the transcript unchanged and retryable.
    state
        .transcripts
        .append_turn(
            req.user_id,
            session_id,
            &TranscriptTurn::new(Role::User, req.message),
        )
        .await?;
    state
        .transcripts
        .append_turn(
            req.user_id,
            session_id,
            &TranscriptTurn::new(Role::Assistant, reply.clone()),
        )
        .await?;

    Ok(Json(ChatResponse {
        reply,
        message_count: history.len() + 2,
    }))
}
