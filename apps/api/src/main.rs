mod chat;
mod coaching;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod personas;
mod routes;
mod sessions;
mod state;
mod transcript;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::coaching::analyzer::LlmFeedbackAnalyzer;
use crate::coaching::registry::MonitorRegistry;
use crate::coaching::store::RedisFeedbackStore;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::transcript::RedisTranscriptStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Log targets are rooted at the bin crate name ("api"), not the
            // package name, so the directive must use CARGO_CRATE_NAME.
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Salescoach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.db_max_connections).await?;

    // Initialize Redis-backed stores (transcripts + feedback histories)
    let redis = redis::Client::open(config.redis_url.clone())?;
    let transcripts = Arc::new(RedisTranscriptStore::new(redis.clone()));
    let feedback = Arc::new(RedisFeedbackStore::new(redis));
    info!("Redis stores initialized");

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Monitor registry: one background polling task per actively coached session
    let coaching = Arc::new(MonitorRegistry::new(
        transcripts.clone(),
        Arc::new(LlmFeedbackAnalyzer::new(llm.clone())),
        feedback.clone(),
        Duration::from_secs(config.coach_poll_interval_secs),
    ));
    info!(
        "Coaching monitor registry initialized (poll interval: {}s)",
        config.coach_poll_interval_secs
    );

    // Build app state
    let state = AppState {
        db,
        llm,
        transcripts,
        feedback,
        coaching,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_default_log_filter_matches_crate_log_targets() {
        // The fallback EnvFilter directive is "<crate>=<level>". Tracing
        // targets default to the module path, which is rooted at the crate
        // name — if the two ever diverge (e.g. through a package rename),
        // the default filter silently drops every application log line.
        let target_root = module_path!()
            .split("::")
            .next()
            .expect("module path has a crate root");
        assert_eq!(env!("CARGO_CRATE_NAME"), target_root);
    }
}
