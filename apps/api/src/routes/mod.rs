pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::chat::handlers as chat_handlers;
use crate::coaching::handlers as coaching_handlers;
use crate::personas::handlers as persona_handlers;
use crate::sessions::handlers as session_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(session_handlers::handle_create_session))
        .route("/api/v1/sessions", get(session_handlers::handle_list_sessions))
        .route("/api/v1/sessions/:id", get(session_handlers::handle_get_session))
        .route(
            "/api/v1/sessions/:id",
            delete(session_handlers::handle_delete_session),
        )
        // Personas
        .route("/api/v1/personas", post(persona_handlers::handle_create_persona))
        .route("/api/v1/personas", get(persona_handlers::handle_list_personas))
        .route("/api/v1/personas/:id", get(persona_handlers::handle_get_persona))
        // Persona chat
        .route("/api/v1/chat/:session_id", post(chat_handlers::handle_chat))
        // AI coaching
        .route(
            "/api/v1/coaching/start/:session_id",
            post(coaching_handlers::handle_start),
        )
        .route(
            "/api/v1/coaching/stop/:session_id",
            post(coaching_handlers::handle_stop),
        )
        .route(
            "/api/v1/coaching/status/:session_id",
            get(coaching_handlers::handle_status),
        )
        .route(
            "/api/v1/coaching/feedback/:session_id",
            get(coaching_handlers::handle_feedback),
        )
        .route(
            "/api/v1/coaching/analyze/:session_id",
            post(coaching_handlers::handle_analyze),
        )
        .route(
            "/api/v1/coaching/admin/active",
            get(coaching_handlers::handle_active_monitors),
        )
        .with_state(state)
}
