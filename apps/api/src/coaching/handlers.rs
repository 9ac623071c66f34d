use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coaching::registry::MonitorSnapshot;
use crate::coaching::store::FeedbackEntry;
use crate::errors::AppError;
use crate::sessions::require_session;
use crate::state::AppState;

/// Caller identity, established by the upstream auth gateway.
#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct StartCoachingResponse {
    pub message: String,
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub initial_message_count: usize,
    pub monitoring_status: &'static str,
}

#[derive(Serialize)]
pub struct StopCoachingResponse {
    pub message: String,
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub monitoring_status: &'static str,
}

#[derive(Serialize)]
pub struct CoachingStatusResponse {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub is_monitoring: bool,
    pub message_count: usize,
    pub feedback_count: usize,
    pub monitoring_started_at: Option<DateTime<Utc>>,
    pub last_checked: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct CoachingFeedbackResponse {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub feedback_history: Vec<FeedbackEntry>,
    pub total_feedback_count: usize,
    pub is_monitoring_active: bool,
}

#[derive(Serialize)]
pub struct ActiveMonitorsResponse {
    pub active_count: usize,
    pub monitors: Vec<MonitorSnapshot>,
    pub poll_interval_secs: u64,
    pub timestamp: DateTime<Utc>,
}

/// POST /api/v1/coaching/start/:session_id
pub async fn handle_start(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<StartCoachingResponse>, AppError> {
    require_session(&state.db, session_id, params.user_id).await?;

    let snapshot = state.coaching.start(params.user_id, session_id).await?;
    Ok(Json(StartCoachingResponse {
        message: "AI coaching started, monitoring for new messages".to_string(),
        user_id: params.user_id,
        session_id,
        initial_message_count: snapshot.message_count,
        monitoring_status: "active",
    }))
}

/// POST /api/v1/coaching/stop/:session_id
pub async fn handle_stop(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<StopCoachingResponse>, AppError> {
    require_session(&state.db, session_id, params.user_id).await?;

    state.coaching.stop(params.user_id, session_id)?;
    Ok(Json(StopCoachingResponse {
        message: "AI coaching monitoring stopped".to_string(),
        user_id: params.user_id,
        session_id,
        monitoring_status: "stopped",
    }))
}

/// GET /api/v1/coaching/status/:session_id
///
/// Distinguishes "never started" (no handle, empty history) from "active"
/// from "stopped and cleaned up" (no handle, history still persisted).
pub async fn handle_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<CoachingStatusResponse>, AppError> {
    require_session(&state.db, session_id, params.user_id).await?;

    let snapshot = state.coaching.status(params.user_id, session_id);
    let turns = state
        .transcripts
        .get_turns(params.user_id, session_id)
        .await?;
    let history = state
        .feedback
        .read_history(params.user_id, session_id)
        .await?;

    Ok(Json(CoachingStatusResponse {
        user_id: params.user_id,
        session_id,
        is_monitoring: snapshot.is_some(),
        message_count: turns.len(),
        feedback_count: history.len(),
        monitoring_started_at: snapshot.as_ref().map(|s| s.started_at),
        last_checked: snapshot.as_ref().map(|s| s.last_checked),
    }))
}

/// GET /api/v1/coaching/feedback/:session_id
pub async fn handle_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<CoachingFeedbackResponse>, AppError> {
    require_session(&state.db, session_id, params.user_id).await?;

    let history = state
        .feedback
        .read_history(params.user_id, session_id)
        .await?;
    let is_active = state.coaching.status(params.user_id, session_id).is_some();

    Ok(Json(CoachingFeedbackResponse {
        user_id: params.user_id,
        session_id,
        total_feedback_count: history.len(),
        feedback_history: history,
        is_monitoring_active: is_active,
    }))
}

/// POST /api/v1/coaching/analyze/:session_id
///
/// On-demand analysis of the trailing window, independent of monitoring.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<FeedbackEntry>, AppError> {
    require_session(&state.db, session_id, params.user_id).await?;

    let entry = state.coaching.analyze_now(params.user_id, session_id).await?;
    Ok(Json(entry))
}

/// GET /api/v1/coaching/admin/active — diagnostic snapshot of all monitors.
pub async fn handle_active_monitors(
    State(state): State<AppState>,
) -> Json<ActiveMonitorsResponse> {
    let monitors = state.coaching.list_all();
    Json(ActiveMonitorsResponse {
        active_count: monitors.len(),
        monitors,
        poll_interval_secs: state.config.coach_poll_interval_secs,
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_monitors_response_reports_poll_interval() {
        let response = ActiveMonitorsResponse {
            active_count: 0,
            monitors: vec![],
            poll_interval_secs: 15,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["active_count"], 0);
        assert_eq!(json["poll_interval_secs"], 15);
        assert!(json["monitors"].as_array().unwrap().is_empty());
    }
}
