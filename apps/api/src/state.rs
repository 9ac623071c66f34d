use std::sync::Arc;

use sqlx::PgPool;

use crate::coaching::registry::MonitorRegistry;
use crate::coaching::store::FeedbackStore;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::transcript::TranscriptStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    /// Chat transcripts, held externally in Redis.
    pub transcripts: Arc<dyn TranscriptStore>,
    /// Coaching feedback histories, held externally in Redis with a 24 h TTL.
    pub feedback: Arc<dyn FeedbackStore>,
    /// Monitor registry owned by the composition root; the only place that
    /// tracks which sessions have an active coaching task.
    pub coaching: Arc<MonitorRegistry>,
    pub config: Config,
}
