//! Persona chat — one LLM round-trip per trainee message, with the full
//! transcript replayed as conversation history. Both the trainee's message
//! and the persona's reply are appended to the Transcript Store, which is
//! what the coaching monitor polls.

pub mod handlers;
pub mod prompts;

use crate::errors::AppError;
use crate::llm_client::{ChatMessage, LlmClient};
use crate::models::persona::PersonaRow;
use crate::transcript::{Role, TranscriptTurn};

/// Produces the persona's reply to `message` given the prior transcript.
pub async fn respond(
    llm: &LlmClient,
    persona: &PersonaRow,
    history: &[TranscriptTurn],
    message: &str,
) -> Result<String, AppError> {
    let system = prompts::render_persona_system(persona);

    let mut messages: Vec<ChatMessage> = history.iter().map(to_chat_message).collect();
    messages.push(ChatMessage::user(message));

    let response = llm
        .chat(&messages, &system)
        .await
        .map_err(|e| AppError::Llm(format!("Persona chat failed: {e}")))?;
    let reply = response
        .text()
        .ok_or_else(|| AppError::Llm("Persona returned empty content".to_string()))?;
    Ok(reply.trim().to_string())
}

fn to_chat_message(turn: &TranscriptTurn) -> ChatMessage {
    match turn.role {
        Role::User => ChatMessage::user(turn.content.clone()),
        Role::Assistant => ChatMessage::assistant(turn.content.clone()),
    }
}
