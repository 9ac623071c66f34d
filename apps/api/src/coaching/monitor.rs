//! Polling Task — the per-session monitoring loop.
//!
//! One task per monitored session. Each iteration: sleep (the only suspension
//! point, interrupted immediately by cancellation), fetch the transcript,
//! compare its length to the cursor, and analyze only on growth. Transient
//! store or analyzer failures are logged and skipped — they never kill the
//! loop. An empty or vanished transcript is fatal for this session's monitor
//! and ends the task without an explicit stop.
//!
//! Whatever ends the loop, the handle is deregistered exactly once on exit.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::coaching::analyzer::trailing_window;
use crate::coaching::registry::MonitorRegistry;
use crate::coaching::store::TriggerType;
use crate::errors::AppError;

enum PollOutcome {
    /// Nothing new, or new turns analyzed and persisted.
    Continue,
    /// The transcript is gone; monitoring for this session is over.
    TranscriptGone,
}

pub(crate) async fn run(
    registry: Arc<MonitorRegistry>,
    user_id: Uuid,
    session_id: Uuid,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(registry.poll_interval()) => {}
        }

        match poll_once(&registry, user_id, session_id).await {
            Ok(PollOutcome::Continue) => {}
            Ok(PollOutcome::TranscriptGone) => {
                tracing::info!(
                    %user_id, %session_id,
                    "transcript no longer available, ending coaching monitor"
                );
                break;
            }
            Err(err) => {
                // Transient backend failure: skip this iteration, keep looping.
                tracing::warn!(%user_id, %session_id, "coaching poll failed, will retry: {err}");
            }
        }
    }

    registry.deregister(user_id, session_id);
}

async fn poll_once(
    registry: &MonitorRegistry,
    user_id: Uuid,
    session_id: Uuid,
) -> Result<PollOutcome, AppError> {
    let turns = registry.transcripts().get_turns(user_id, session_id).await?;
    let Some(newest) = turns.last() else {
        return Ok(PollOutcome::TranscriptGone);
    };
    let current_count = turns.len();

    // Handle already removed: a stop raced this iteration. Nothing to do —
    // the cancellation will be observed at the next select.
    let Some(last_count) = registry.cursor(user_id, session_id) else {
        return Ok(PollOutcome::Continue);
    };

    if current_count <= last_count {
        if current_count < last_count {
            // Externally truncated transcript. Treated as "nothing new";
            // flagged for product clarification whether it deserves more.
            tracing::debug!(
                %user_id, %session_id, current_count, last_count,
                "transcript shrank between polls"
            );
        }
        registry.record_check(user_id, session_id);
        return Ok(PollOutcome::Continue);
    }

    tracing::debug!(
        %user_id, %session_id, current_count, last_count,
        "new transcript turns detected, analyzing"
    );

    let note = registry
        .analyzer()
        .analyze(trailing_window(&turns), newest)
        .await?;
    registry
        .feedback()
        .append(
            user_id,
            session_id,
            &note,
            current_count,
            TriggerType::AutoMonitoring,
        )
        .await?;

    // Advance the cursor only after the note is persisted, so a failed append
    // is retried against the same delta next iteration.
    registry.record_analysis(user_id, session_id, current_count);
    Ok(PollOutcome::Continue)
}
