//! Monitor Registry — tracks which (user, session) pairs currently have an
//! active coaching monitor and enforces single-instance-per-session.
//!
//! The registry is an explicit object owned by the composition root (held in
//! `AppState` as `Arc<MonitorRegistry>`), never ambient global state. Its map
//! serializes concurrent start/stop calls for the same key; the lock is a std
//! `Mutex` and is never held across an await.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::coaching::analyzer::{trailing_window, FeedbackAnalyzer};
use crate::coaching::monitor;
use crate::coaching::store::{FeedbackEntry, FeedbackStore, TriggerType};
use crate::errors::AppError;
use crate::transcript::{StoreError, TranscriptStore};

pub type MonitorKey = (Uuid, Uuid);

/// Default wait between polling iterations.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("coaching is already active for this session")]
    AlreadyMonitoring,

    #[error("no transcript data found for this session")]
    NoTranscriptData,

    #[error("no active coaching monitor for this session")]
    NotMonitoring,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<MonitorError> for AppError {
    fn from(err: MonitorError) -> Self {
        match err {
            MonitorError::AlreadyMonitoring => AppError::AlreadyMonitoring,
            MonitorError::NoTranscriptData => AppError::NoTranscriptData,
            MonitorError::NotMonitoring => AppError::NotMonitoring,
            MonitorError::Store(e) => AppError::Store(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorStatus {
    Active,
    /// Cancellation requested; the task has not yet deregistered itself.
    Stopping,
}

/// One active monitoring session. Owns the cancellable background task.
struct MonitorEntry {
    /// Cursor: last transcript length observed for this session.
    last_count: usize,
    started_at: DateTime<Utc>,
    last_checked: DateTime<Utc>,
    status: MonitorStatus,
    cancel: CancellationToken,
    /// Owned so the handle's lifetime matches the registration; the task is
    /// cooperative and is never aborted through this.
    #[allow(dead_code)]
    task: JoinHandle<()>,
}

/// Read-only snapshot of a `MonitorEntry`, safe to hand to callers.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub message_count: usize,
    pub started_at: DateTime<Utc>,
    pub last_checked: DateTime<Utc>,
    pub status: MonitorStatus,
}

pub struct MonitorRegistry {
    transcripts: Arc<dyn TranscriptStore>,
    analyzer: Arc<dyn FeedbackAnalyzer>,
    feedback: Arc<dyn FeedbackStore>,
    poll_interval: Duration,
    active: Mutex<HashMap<MonitorKey, MonitorEntry>>,
}

impl MonitorRegistry {
    pub fn new(
        transcripts: Arc<dyn TranscriptStore>,
        analyzer: Arc<dyn FeedbackAnalyzer>,
        feedback: Arc<dyn FeedbackStore>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            transcripts,
            analyzer,
            feedback,
            poll_interval,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Starts monitoring a session. The transcript must already contain at
    /// least one turn, and no monitor may exist for the pair yet. On success
    /// the cursor is initialized to the current transcript length and one
    /// background polling task is spawned.
    pub async fn start(
        self: &Arc<Self>,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<MonitorSnapshot, MonitorError> {
        let turns = self.transcripts.get_turns(user_id, session_id).await?;
        if turns.is_empty() {
            return Err(MonitorError::NoTranscriptData);
        }

        let now = Utc::now();
        let mut active = self.lock();
        if active.contains_key(&(user_id, session_id)) {
            return Err(MonitorError::AlreadyMonitoring);
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(monitor::run(
            Arc::clone(self),
            user_id,
            session_id,
            cancel.clone(),
        ));

        let entry = MonitorEntry {
            last_count: turns.len(),
            started_at: now,
            last_checked: now,
            status: MonitorStatus::Active,
            cancel,
            task,
        };
        let snapshot = snapshot_of(user_id, session_id, &entry);
        active.insert((user_id, session_id), entry);

        tracing::info!(
            %user_id, %session_id,
            initial_count = snapshot.message_count,
            "coaching monitor started"
        );
        Ok(snapshot)
    }

    /// Requests cancellation of a session's monitor. Returns without waiting
    /// for the task: final deregistration happens in the task's own cleanup.
    /// A second stop for the same pair reports `NotMonitoring`.
    pub fn stop(&self, user_id: Uuid, session_id: Uuid) -> Result<(), MonitorError> {
        let mut active = self.lock();
        match active.get_mut(&(user_id, session_id)) {
            None => Err(MonitorError::NotMonitoring),
            Some(entry) if entry.status == MonitorStatus::Stopping => {
                Err(MonitorError::NotMonitoring)
            }
            Some(entry) => {
                entry.status = MonitorStatus::Stopping;
                entry.cancel.cancel();
                tracing::info!(%user_id, %session_id, "coaching monitor stop requested");
                Ok(())
            }
        }
    }

    /// Read-only snapshot of one monitor, `None` when the pair has no handle
    /// (never started, or already stopped and cleaned up).
    pub fn status(&self, user_id: Uuid, session_id: Uuid) -> Option<MonitorSnapshot> {
        let active = self.lock();
        active
            .get(&(user_id, session_id))
            .map(|entry| snapshot_of(user_id, session_id, entry))
    }

    /// Snapshot copy of every active monitor, for diagnostics. Callers get
    /// owned data and cannot reach the registry's live state through it.
    pub fn list_all(&self) -> Vec<MonitorSnapshot> {
        let active = self.lock();
        active
            .iter()
            .map(|(&(user_id, session_id), entry)| snapshot_of(user_id, session_id, entry))
            .collect()
    }

    /// One-shot, on-demand analysis of the trailing window, recorded with the
    /// `manual` trigger. Independent of whether a monitor is running; never
    /// touches any monitor's cursor.
    pub async fn analyze_now(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<FeedbackEntry, AppError> {
        let turns = self.transcripts.get_turns(user_id, session_id).await?;
        let Some(newest) = turns.last() else {
            return Err(AppError::NoTranscriptData);
        };

        let note = self
            .analyzer
            .analyze(trailing_window(&turns), newest)
            .await?;
        let entry = self
            .feedback
            .append(user_id, session_id, &note, turns.len(), TriggerType::Manual)
            .await?;
        Ok(entry)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MonitorKey, MonitorEntry>> {
        // A poisoned map still holds consistent entries; keep serving.
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── accessors and bookkeeping used by the polling task ─────────────────

    pub(crate) fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub(crate) fn transcripts(&self) -> &Arc<dyn TranscriptStore> {
        &self.transcripts
    }

    pub(crate) fn analyzer(&self) -> &Arc<dyn FeedbackAnalyzer> {
        &self.analyzer
    }

    pub(crate) fn feedback(&self) -> &Arc<dyn FeedbackStore> {
        &self.feedback
    }

    /// Current cursor for a pair; `None` once the handle is gone.
    pub(crate) fn cursor(&self, user_id: Uuid, session_id: Uuid) -> Option<usize> {
        let active = self.lock();
        active.get(&(user_id, session_id)).map(|e| e.last_count)
    }

    /// Advances the cursor after a successful analysis. The cursor only ever
    /// moves forward; a stale or racing update can never shrink it.
    pub(crate) fn record_analysis(&self, user_id: Uuid, session_id: Uuid, count: usize) {
        let mut active = self.lock();
        if let Some(entry) = active.get_mut(&(user_id, session_id)) {
            entry.last_count = entry.last_count.max(count);
            entry.last_checked = Utc::now();
        }
    }

    /// Refreshes `last_checked` after a quiet iteration.
    pub(crate) fn record_check(&self, user_id: Uuid, session_id: Uuid) {
        let mut active = self.lock();
        if let Some(entry) = active.get_mut(&(user_id, session_id)) {
            entry.last_checked = Utc::now();
        }
    }

    /// Removes the handle for a pair. Called exactly once by each polling
    /// task as it exits, whatever made it exit; tolerates the handle already
    /// being gone.
    pub(crate) fn deregister(&self, user_id: Uuid, session_id: Uuid) {
        let mut active = self.lock();
        if active.remove(&(user_id, session_id)).is_some() {
            tracing::info!(%user_id, %session_id, "coaching monitor deregistered");
        }
    }
}

fn snapshot_of(user_id: Uuid, session_id: Uuid, entry: &MonitorEntry) -> MonitorSnapshot {
    MonitorSnapshot {
        user_id,
        session_id,
        message_count: entry.last_count,
        started_at: entry.started_at,
        last_checked: entry.last_checked,
        status: entry.status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{Role, TranscriptTurn};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    // ── in-memory fakes for the three external collaborators ──────────────

    #[derive(Default)]
    struct FakeTranscripts {
        turns: Mutex<Vec<TranscriptTurn>>,
        unreachable: AtomicBool,
    }

    impl FakeTranscripts {
        fn with_turns(n: usize) -> Arc<Self> {
            let fake = Arc::new(Self::default());
            fake.set_turns(n);
            fake
        }

        fn set_turns(&self, n: usize) {
            let mut turns = self.turns.lock().unwrap();
            *turns = (0..n)
                .map(|i| {
                    let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
                    TranscriptTurn::new(role, format!("turn {i}"))
                })
                .collect();
        }

        fn set_unreachable(&self, broken: bool) {
            self.unreachable.store(broken, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl TranscriptStore for FakeTranscripts {
        async fn get_turns(
            &self,
            _user_id: Uuid,
            _session_id: Uuid,
        ) -> Result<Vec<TranscriptTurn>, StoreError> {
            if self.unreachable.load(Ordering::SeqCst) {
                return Err(StoreError::Redis(redis::RedisError::from((
                    redis::ErrorKind::IoError,
                    "simulated outage",
                ))));
            }
            Ok(self.turns.lock().unwrap().clone())
        }

        async fn append_turn(
            &self,
            _user_id: Uuid,
            _session_id: Uuid,
            turn: &TranscriptTurn,
        ) -> Result<(), StoreError> {
            self.turns.lock().unwrap().push(turn.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeAnalyzer {
        windows_seen: Mutex<Vec<Vec<TranscriptTurn>>>,
        failing: AtomicBool,
    }

    #[async_trait]
    impl FeedbackAnalyzer for FakeAnalyzer {
        async fn analyze(
            &self,
            recent: &[TranscriptTurn],
            _newest: &TranscriptTurn,
        ) -> Result<String, AppError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(AppError::Llm("simulated analyzer failure".into()));
            }
            self.windows_seen.lock().unwrap().push(recent.to_vec());
            Ok(format!("note on {} turns", recent.len()))
        }
    }

    #[derive(Default)]
    struct FakeFeedback {
        histories: Mutex<HashMap<MonitorKey, Vec<FeedbackEntry>>>,
    }

    impl FakeFeedback {
        fn entries(&self, user_id: Uuid, session_id: Uuid) -> Vec<FeedbackEntry> {
            self.histories
                .lock()
                .unwrap()
                .get(&(user_id, session_id))
                .cloned()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl FeedbackStore for FakeFeedback {
        async fn append(
            &self,
            user_id: Uuid,
            session_id: Uuid,
            feedback: &str,
            message_count: usize,
            trigger: TriggerType,
        ) -> Result<FeedbackEntry, StoreError> {
            let mut histories = self.histories.lock().unwrap();
            let entries = histories.entry((user_id, session_id)).or_default();
            let entry = FeedbackEntry {
                seq: entries.last().map_or(1, |e| e.seq + 1),
                feedback: feedback.to_string(),
                timestamp: Utc::now(),
                message_count_at_time: message_count,
                trigger,
            };
            entries.push(entry.clone());
            Ok(entry)
        }

        async fn read_history(
            &self,
            user_id: Uuid,
            session_id: Uuid,
        ) -> Result<Vec<FeedbackEntry>, StoreError> {
            Ok(self.entries(user_id, session_id))
        }
    }

    // ── harness ────────────────────────────────────────────────────────────

    struct Harness {
        registry: Arc<MonitorRegistry>,
        transcripts: Arc<FakeTranscripts>,
        analyzer: Arc<FakeAnalyzer>,
        feedback: Arc<FakeFeedback>,
        user_id: Uuid,
        session_id: Uuid,
    }

    fn harness(initial_turns: usize) -> Harness {
        let transcripts = FakeTranscripts::with_turns(initial_turns);
        let analyzer = Arc::new(FakeAnalyzer::default());
        let feedback = Arc::new(FakeFeedback::default());
        let registry = Arc::new(MonitorRegistry::new(
            transcripts.clone(),
            analyzer.clone(),
            feedback.clone(),
            DEFAULT_POLL_INTERVAL,
        ));
        Harness {
            registry,
            transcripts,
            analyzer,
            feedback,
            user_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
        }
    }

    /// Advances the paused clock past one polling interval and lets the
    /// monitor task run its iteration.
    async fn tick(h: &Harness) {
        tokio::time::sleep(h.registry.poll_interval() + Duration::from_millis(10)).await;
        settle().await;
    }

    /// Yields enough times for spawned tasks to observe cancellation or
    /// finish an in-flight iteration on the current-thread test runtime.
    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    // ── start/stop/status contract ─────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_start_initializes_cursor_from_transcript() {
        let h = harness(2);

        let snapshot = h.registry.start(h.user_id, h.session_id).await.unwrap();
        assert_eq!(snapshot.message_count, 2);
        assert_eq!(snapshot.status, MonitorStatus::Active);

        let status = h.registry.status(h.user_id, h.session_id).unwrap();
        assert_eq!(status.message_count, 2);
        assert!(h.feedback.entries(h.user_id, h.session_id).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_rejects_empty_transcript() {
        let h = harness(0);

        let err = h.registry.start(h.user_id, h.session_id).await.unwrap_err();
        assert!(matches!(err, MonitorError::NoTranscriptData));
        assert!(h.registry.status(h.user_id, h.session_id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_start_rejected() {
        let h = harness(2);

        h.registry.start(h.user_id, h.session_id).await.unwrap();
        let err = h.registry.start(h.user_id, h.session_id).await.unwrap_err();
        assert!(matches!(err, MonitorError::AlreadyMonitoring));
        assert_eq!(h.registry.list_all().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_starts_leave_one_handle() {
        let h = harness(3);

        let (a, b) = tokio::join!(
            h.registry.start(h.user_id, h.session_id),
            h.registry.start(h.user_id, h.session_id),
        );
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        assert_eq!(h.registry.list_all().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_never_started_reports_not_monitoring() {
        let h = harness(2);

        let err = h.registry.stop(h.user_id, h.session_id).unwrap_err();
        assert!(matches!(err, MonitorError::NotMonitoring));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let h = harness(2);
        h.registry.start(h.user_id, h.session_id).await.unwrap();

        assert!(h.registry.stop(h.user_id, h.session_id).is_ok());
        // Second stop, before or after the task cleans up, is a plain
        // NotMonitoring — never an internal error.
        let err = h.registry.stop(h.user_id, h.session_id).unwrap_err();
        assert!(matches!(err, MonitorError::NotMonitoring));

        settle().await;
        assert!(h.registry.status(h.user_id, h.session_id).is_none());
        assert!(h.registry.stop(h.user_id, h.session_id).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_sleep_and_deregisters() {
        let h = harness(2);
        h.registry.start(h.user_id, h.session_id).await.unwrap();

        // No clock advance: the task is parked in its 15 s sleep. Stop must
        // end it promptly rather than waiting out the interval.
        h.registry.stop(h.user_id, h.session_id).unwrap();
        settle().await;

        assert!(h.registry.status(h.user_id, h.session_id).is_none());
        assert!(h.registry.list_all().is_empty());
    }

    // ── polling behavior ───────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_growth_triggers_windowed_analysis() {
        let h = harness(2);
        h.registry.start(h.user_id, h.session_id).await.unwrap();

        h.transcripts.set_turns(5);
        tick(&h).await;

        let entries = h.feedback.entries(h.user_id, h.session_id);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message_count_at_time, 5);
        assert_eq!(entries[0].trigger, TriggerType::AutoMonitoring);

        // Analyzer saw only the trailing window: last 4 of the 5 turns.
        let windows = h.analyzer.windows_seen.lock().unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].len(), 4);
        assert_eq!(windows[0][0].content, "turn 1");
        assert_eq!(windows[0][3].content, "turn 4");
        drop(windows);

        let status = h.registry.status(h.user_id, h.session_id).unwrap();
        assert_eq!(status.message_count, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_growth_appends_nothing() {
        let h = harness(3);
        h.registry.start(h.user_id, h.session_id).await.unwrap();

        for _ in 0..4 {
            tick(&h).await;
        }

        assert!(h.feedback.entries(h.user_id, h.session_id).is_empty());
        assert!(h.analyzer.windows_seen.lock().unwrap().is_empty());
        let status = h.registry.status(h.user_id, h.session_id).unwrap();
        assert_eq!(status.message_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shrinking_transcript_is_benign_noop() {
        let h = harness(4);
        h.registry.start(h.user_id, h.session_id).await.unwrap();

        h.transcripts.set_turns(2);
        tick(&h).await;

        assert!(h.feedback.entries(h.user_id, h.session_id).is_empty());
        // Cursor never decreases.
        let status = h.registry.status(h.user_id, h.session_id).unwrap();
        assert_eq!(status.message_count, 4);
        assert_eq!(status.status, MonitorStatus::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cursor_is_monotonic_across_growth() {
        let h = harness(2);
        h.registry.start(h.user_id, h.session_id).await.unwrap();

        h.transcripts.set_turns(4);
        tick(&h).await;
        h.transcripts.set_turns(7);
        tick(&h).await;

        let entries = h.feedback.entries(h.user_id, h.session_id);
        let counts: Vec<usize> = entries.iter().map(|e| e.message_count_at_time).collect();
        assert_eq!(counts, vec![4, 7]);
        assert!(counts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_store_failure_keeps_monitor_alive() {
        let h = harness(2);
        h.registry.start(h.user_id, h.session_id).await.unwrap();

        h.transcripts.set_unreachable(true);
        tick(&h).await;
        assert!(h.registry.status(h.user_id, h.session_id).is_some());

        h.transcripts.set_unreachable(false);
        h.transcripts.set_turns(4);
        tick(&h).await;

        assert_eq!(h.feedback.entries(h.user_id, h.session_id).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyzer_failure_retries_same_delta() {
        let h = harness(2);
        h.registry.start(h.user_id, h.session_id).await.unwrap();

        h.analyzer.failing.store(true, Ordering::SeqCst);
        h.transcripts.set_turns(4);
        tick(&h).await;

        // Failed analysis: no entry, cursor not advanced.
        assert!(h.feedback.entries(h.user_id, h.session_id).is_empty());
        assert_eq!(
            h.registry.status(h.user_id, h.session_id).unwrap().message_count,
            2
        );

        h.analyzer.failing.store(false, Ordering::SeqCst);
        tick(&h).await;
        let entries = h.feedback.entries(h.user_id, h.session_id);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message_count_at_time, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_vanished_transcript_self_deregisters() {
        let h = harness(2);
        h.registry.start(h.user_id, h.session_id).await.unwrap();

        h.transcripts.set_turns(5);
        tick(&h).await;
        assert_eq!(h.feedback.entries(h.user_id, h.session_id).len(), 1);

        // Externally expired: fatal for this monitor, no explicit stop needed.
        h.transcripts.set_turns(0);
        tick(&h).await;

        assert!(h.registry.status(h.user_id, h.session_id).is_none());
        assert!(h.registry.list_all().is_empty());
        // Prior feedback survives the monitor.
        assert_eq!(h.feedback.entries(h.user_id, h.session_id).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_survives_stop() {
        let h = harness(2);
        h.registry.start(h.user_id, h.session_id).await.unwrap();

        h.transcripts.set_turns(4);
        tick(&h).await;
        let before = h.feedback.entries(h.user_id, h.session_id);
        assert_eq!(before.len(), 1);

        h.registry.stop(h.user_id, h.session_id).unwrap();
        settle().await;

        let after = h.feedback.entries(h.user_id, h.session_id);
        assert_eq!(after.len(), before.len());
        assert_eq!(after[0].seq, before[0].seq);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_analysis_after_stop() {
        let h = harness(2);
        h.registry.start(h.user_id, h.session_id).await.unwrap();

        h.registry.stop(h.user_id, h.session_id).unwrap();
        settle().await;

        h.transcripts.set_turns(6);
        tick(&h).await;

        assert!(h.feedback.entries(h.user_id, h.session_id).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop_is_allowed() {
        let h = harness(2);
        h.registry.start(h.user_id, h.session_id).await.unwrap();
        h.registry.stop(h.user_id, h.session_id).unwrap();
        settle().await;

        let snapshot = h.registry.start(h.user_id, h.session_id).await.unwrap();
        assert_eq!(snapshot.message_count, 2);
        assert_eq!(h.registry.list_all().len(), 1);
    }

    // ── on-demand analysis ─────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_analyze_now_records_manual_trigger() {
        let h = harness(3);

        let entry = h.registry.analyze_now(h.user_id, h.session_id).await.unwrap();
        assert_eq!(entry.trigger, TriggerType::Manual);
        assert_eq!(entry.message_count_at_time, 3);
        // No monitor handle was created as a side effect.
        assert!(h.registry.status(h.user_id, h.session_id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_now_requires_transcript() {
        let h = harness(0);

        let err = h.registry.analyze_now(h.user_id, h.session_id).await.unwrap_err();
        assert!(matches!(err, AppError::NoTranscriptData));
    }
}
