// src/recording/session.rs
//! Recording session state machine
//!
//! One session owns one content store and drives the capture loop:
//!
//! ```text
//! Created ── action ok ──► Running ── stop condition ──► Stopped
//!    │                        │
//!    └── action failed ───────┴── manual stop ────────► Stopped
//! ```
//!
//! While Running, each tick captures a snapshot, hashes it, and compares
//! against the previous snapshot. Changed content updates the idle clock
//! and runs the diff engine and event detector; unchanged snapshots are
//! persisted too so the absolute timing of ticks stays recoverable. A
//! failed capture skips the tick without stopping the session. Stop
//! conditions are checked cooperatively once per tick; the earliest a
//! manual stop takes effect is the next loop-condition check.

use crate::diff;
use crate::host::{ActionSpec, AutomationHost};
use crate::recording::content_store::ContentStore;
use crate::recording::events::{detect_events, SignificantEvent};
use crate::utils::config::RecordingConfig;
use crate::utils::errors::Result;
use crate::utils::hash::content_hash;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use ulid::Ulid;

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created, triggering action not yet completed
    Created,

    /// Capture loop active
    Running,

    /// Manual stop requested, loop has not yet observed it
    Stopping,

    /// Terminal; the stop reason is recorded permanently
    Stopped,
}

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No content change for the idle threshold
    Idle,

    /// Recording duration elapsed
    Timeout,

    /// Explicit stop request
    Manual,

    /// The triggering action failed
    Error,

    /// Snapshot limit reached
    MaxSnapshots,
}

/// Effective (already clamped) session parameters
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SessionParams {
    /// Total recording window in milliseconds
    pub duration_ms: u64,

    /// Capture interval in milliseconds
    pub interval_ms: u64,

    /// Stop after this long without a content change, in milliseconds
    pub idle_threshold_ms: u64,

    /// Maximum snapshots before a forced stop
    pub max_snapshots: usize,
}

impl SessionParams {
    /// Apply the configured clamps to caller-supplied values
    pub fn clamped(
        config: &RecordingConfig,
        duration_ms: Option<u64>,
        interval_ms: Option<u64>,
        idle_threshold_ms: Option<u64>,
    ) -> Self {
        let duration_ms = config.clamp_duration_ms(duration_ms);
        Self {
            duration_ms,
            interval_ms: config.clamp_interval_ms(interval_ms),
            idle_threshold_ms: config.clamp_idle_threshold_ms(idle_threshold_ms, duration_ms),
            max_snapshots: config.max_snapshots,
        }
    }
}

/// Mutable session state, only ever written by the owning capture loop and
/// the explicit stop path
struct Inner {
    state: SessionState,
    stop_reason: Option<StopReason>,
    stop_requested: bool,
    ended_at_ms: Option<u64>,
    last_change_at_ms: u64,
    last_hash: Option<u64>,
    changed_ticks: u64,
    events: Vec<SignificantEvent>,
    error: Option<String>,
}

/// Caller-facing view of a session
#[derive(Debug, Clone, Serialize)]
pub struct RecordingInfo {
    pub id: String,

    /// Triggering action with free-text payloads redacted
    pub trigger: ActionSpec,

    pub state: SessionState,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,

    pub started_at: DateTime<Utc>,

    /// Milliseconds from start to stop, present once stopped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at_ms: Option<u64>,

    /// Milliseconds from start to the last observed content change
    pub last_change_at_ms: u64,

    pub snapshot_count: usize,

    /// Ticks whose content differed from the previous snapshot
    pub changed_ticks: u64,

    pub events: Vec<SignificantEvent>,

    pub is_active: bool,

    pub params: SessionParams,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One recording session
pub struct RecordingSession {
    id: String,
    trigger: ActionSpec,
    params: SessionParams,
    started_at: DateTime<Utc>,
    store: ContentStore,
    inner: RwLock<Inner>,
}

impl RecordingSession {
    /// Create a session in the `Created` state
    ///
    /// The action spec is stored redacted; the unredacted spec is passed
    /// to `run` separately so typed text never lands in session state.
    pub fn new(action: &ActionSpec, params: SessionParams) -> Self {
        Self {
            id: format!("rec_{}", Ulid::new()),
            trigger: action.redacted(),
            params,
            started_at: Utc::now(),
            store: ContentStore::new(),
            inner: RwLock::new(Inner {
                state: SessionState::Created,
                stop_reason: None,
                stop_requested: false,
                ended_at_ms: None,
                last_change_at_ms: 0,
                last_hash: None,
                changed_ticks: 0,
                events: Vec::new(),
                error: None,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn params(&self) -> SessionParams {
        self.params
    }

    /// The session's snapshot storage
    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// True until the session reaches `Stopped`
    pub fn is_active(&self) -> bool {
        self.inner.read().state != SessionState::Stopped
    }

    /// Stop reason once stopped
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.inner.read().stop_reason
    }

    /// Request a manual stop; takes effect at the next loop-condition
    /// check. Returns false when the session is already stopped.
    pub fn request_stop(&self) -> bool {
        let mut inner = self.inner.write();
        match inner.state {
            SessionState::Stopped => false,
            SessionState::Created => {
                // Loop not running yet; stop immediately. If a trigger
                // action is in flight, its loop observes the flag and
                // returns without appending anything.
                inner.stop_requested = true;
                drop(inner);
                self.finalize(StopReason::Manual, 0, None);
                true
            }
            SessionState::Running | SessionState::Stopping => {
                inner.stop_requested = true;
                inner.state = SessionState::Stopping;
                true
            }
        }
    }

    /// Diff two stored snapshots by index
    pub fn diff_snapshots(&self, from_index: usize, to_index: usize) -> Result<diff::DiffResult> {
        let from = self.store.get(from_index)?;
        let to = self.store.get(to_index)?;
        Ok(diff::diff(&from.content, &to.content))
    }

    /// Caller-facing view of current state
    pub fn info(&self) -> RecordingInfo {
        let inner = self.inner.read();
        RecordingInfo {
            id: self.id.clone(),
            trigger: self.trigger.clone(),
            state: inner.state,
            stop_reason: inner.stop_reason,
            started_at: self.started_at,
            ended_at_ms: inner.ended_at_ms,
            last_change_at_ms: inner.last_change_at_ms,
            snapshot_count: self.store.len(),
            changed_ticks: inner.changed_ticks,
            events: inner.events.clone(),
            is_active: inner.state != SessionState::Stopped,
            params: self.params,
            error: inner.error.clone(),
        }
    }

    /// Execute the triggering action, then drive the capture loop until a
    /// stop condition fires
    pub async fn run(self: Arc<Self>, host: Arc<dyn AutomationHost>, action: ActionSpec) {
        info!(id = %self.id, kind = ?action.kind, "starting recording");

        if let Err(e) = host.perform_action(&action).await {
            warn!(id = %self.id, error = %e, "trigger action failed, stopping recording");
            self.finalize(StopReason::Error, 0, Some(e.to_string()));
            return;
        }

        {
            let mut inner = self.inner.write();
            if inner.stop_requested {
                drop(inner);
                self.finalize(StopReason::Manual, 0, None);
                return;
            }
            inner.state = SessionState::Running;
        }

        let started = Instant::now();
        let interval = Duration::from_millis(self.params.interval_ms);
        let idle_threshold = Duration::from_millis(self.params.idle_threshold_ms);
        let duration = Duration::from_millis(self.params.duration_ms);
        let mut last_change = started;

        loop {
            tokio::time::sleep(interval).await;

            if self.inner.read().stop_requested {
                self.finalize(StopReason::Manual, ms_since(started), None);
                return;
            }

            match host.capture_state().await {
                Ok(content) => {
                    let now = Instant::now();
                    let relative_ms = ms_between(started, now);
                    let hash = content_hash(&content);
                    let changed = self.inner.read().last_hash != Some(hash);

                    if changed {
                        last_change = now;
                        if let Some(previous) = self.store.latest() {
                            let result = diff::diff(&previous.content, &content);
                            debug!(
                                id = %self.id,
                                added = result.total_added,
                                removed = result.total_removed,
                                changed = result.total_changed,
                                "content changed"
                            );
                            let mut found = detect_events(&previous.content, &content, relative_ms);
                            if !found.is_empty() {
                                self.inner.write().events.append(&mut found);
                            }
                        }
                    }

                    if self.store.len() >= self.params.max_snapshots {
                        self.finalize(StopReason::MaxSnapshots, relative_ms, None);
                        return;
                    }
                    self.store.append(content, hash, relative_ms);

                    let mut inner = self.inner.write();
                    inner.last_hash = Some(hash);
                    if changed {
                        inner.changed_ticks += 1;
                        inner.last_change_at_ms = relative_ms;
                    }
                }
                Err(e) => {
                    // Skipped tick; retried on the next interval.
                    debug!(id = %self.id, error = %e, "snapshot capture failed, skipping tick");
                }
            }

            let now = Instant::now();
            if now.duration_since(last_change) >= idle_threshold {
                self.finalize(StopReason::Idle, ms_between(started, now), None);
                return;
            }
            if now.duration_since(started) >= duration {
                self.finalize(StopReason::Timeout, ms_between(started, now), None);
                return;
            }
        }
    }

    /// Transition to `Stopped` exactly once; later calls are no-ops
    fn finalize(&self, reason: StopReason, ended_at_ms: u64, error: Option<String>) {
        let mut inner = self.inner.write();
        if inner.state == SessionState::Stopped {
            return;
        }
        inner.state = SessionState::Stopped;
        inner.stop_reason = Some(reason);
        inner.ended_at_ms = Some(ended_at_ms);
        inner.error = error;
        info!(
            id = %self.id,
            reason = ?reason,
            snapshots = self.store.len(),
            events = inner.events.len(),
            "recording stopped"
        );
    }
}

fn ms_since(started: Instant) -> u64 {
    ms_between(started, Instant::now())
}

fn ms_between(started: Instant, now: Instant) -> u64 {
    now.duration_since(started).as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::events::EventKind;
    use crate::utils::errors::EngineError;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Host that serves a scripted sequence of snapshots; the last one
    /// repeats once the script runs out
    struct ScriptedHost {
        states: Mutex<VecDeque<String>>,
        current: Mutex<String>,
        fail_action: bool,
        capture_failures: Mutex<usize>,
    }

    impl ScriptedHost {
        fn new(states: &[&str]) -> Self {
            Self {
                states: Mutex::new(states.iter().map(|s| s.to_string()).collect()),
                current: Mutex::new(states.first().map_or_else(String::new, |s| s.to_string())),
                fail_action: false,
                capture_failures: Mutex::new(0),
            }
        }

        fn failing_action() -> Self {
            let mut host = Self::new(&["unused"]);
            host.fail_action = true;
            host
        }

        fn with_capture_failures(mut self, count: usize) -> Self {
            self.capture_failures = Mutex::new(count);
            self
        }
    }

    #[async_trait::async_trait]
    impl AutomationHost for ScriptedHost {
        async fn capture_state(&self) -> crate::utils::errors::Result<String> {
            {
                let mut failures = self.capture_failures.lock();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(EngineError::CaptureFailed("scripted failure".to_string()));
                }
            }
            if let Some(next) = self.states.lock().pop_front() {
                *self.current.lock() = next;
            }
            Ok(self.current.lock().clone())
        }

        async fn perform_action(&self, _action: &ActionSpec) -> crate::utils::errors::Result<()> {
            if self.fail_action {
                Err(EngineError::ActionFailed("scripted action failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn params(duration_ms: u64, interval_ms: u64, idle_threshold_ms: u64) -> SessionParams {
        SessionParams {
            duration_ms,
            interval_ms,
            idle_threshold_ms,
            max_snapshots: 200,
        }
    }

    async fn run_to_completion(
        session: &Arc<RecordingSession>,
        host: Arc<dyn AutomationHost>,
    ) {
        let handle = tokio::spawn(Arc::clone(session).run(host, ActionSpec::wait()));
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_changing_source_stops_idle() {
        let session = Arc::new(RecordingSession::new(
            &ActionSpec::wait(),
            params(10_000, 100, 50),
        ));
        let host = Arc::new(ScriptedHost::new(&["same page"]));

        run_to_completion(&session, host).await;

        assert_eq!(session.stop_reason(), Some(StopReason::Idle));
        assert!(!session.is_active());
        let info = session.info();
        assert!(info.ended_at_ms.unwrap() < 10_000);
        assert!(info.snapshot_count >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_action_stops_with_error_before_loop() {
        let session = Arc::new(RecordingSession::new(
            &ActionSpec::wait(),
            params(10_000, 100, 2_000),
        ));
        let host = Arc::new(ScriptedHost::failing_action());

        run_to_completion(&session, host).await;

        assert_eq!(session.stop_reason(), Some(StopReason::Error));
        assert_eq!(session.store().len(), 0);
        assert!(session.info().error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_alternating_source_end_to_end() {
        // duration 300ms / interval 100ms against "A","A","B": three
        // snapshots, the middle tick hash-unchanged, the last changed.
        let session = Arc::new(RecordingSession::new(
            &ActionSpec::wait(),
            params(300, 100, 300),
        ));
        let host = Arc::new(ScriptedHost::new(&["A", "A", "B"]));

        run_to_completion(&session, host).await;

        assert_eq!(session.stop_reason(), Some(StopReason::Timeout));
        assert_eq!(session.store().len(), 3);
        assert_eq!(
            session.store().get(0).unwrap().content_hash,
            session.store().get(1).unwrap().content_hash
        );
        assert_ne!(
            session.store().get(1).unwrap().content_hash,
            session.store().get(2).unwrap().content_hash
        );

        let result = session.diff_snapshots(1, 2).unwrap();
        assert_eq!(result.added.len(), 1);
        assert_eq!(result.added[0].text, "B");
        assert_eq!(result.removed.len(), 1);
        assert_eq!(result.removed[0].text, "A");

        // Tick 0 counts as a change (no preceding snapshot), tick 2 too.
        assert_eq!(session.info().changed_ticks, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_snapshots_stops_before_persisting() {
        let session = Arc::new(RecordingSession::new(
            &ActionSpec::wait(),
            SessionParams {
                duration_ms: 10_000,
                interval_ms: 100,
                idle_threshold_ms: 10_000,
                max_snapshots: 2,
            },
        ));
        let host = Arc::new(ScriptedHost::new(&["1", "2", "3", "4", "5"]));

        run_to_completion(&session, host).await;

        assert_eq!(session.stop_reason(), Some(StopReason::MaxSnapshots));
        assert_eq!(session.store().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_failure_skips_tick_without_stopping() {
        let session = Arc::new(RecordingSession::new(
            &ActionSpec::wait(),
            params(1_000, 100, 1_000),
        ));
        let host = Arc::new(ScriptedHost::new(&["page"]).with_capture_failures(2));

        run_to_completion(&session, host).await;

        // Two ticks were skipped; the rest persisted. 1000ms / 100ms gives
        // ten ticks, minus the two failures.
        assert_eq!(session.stop_reason(), Some(StopReason::Timeout));
        assert_eq!(session.store().len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_stop() {
        let session = Arc::new(RecordingSession::new(
            &ActionSpec::wait(),
            params(30_000, 100, 30_000),
        ));
        let host: Arc<dyn AutomationHost> = Arc::new(ScriptedHost::new(&["page"]));
        let handle = tokio::spawn(Arc::clone(&session).run(host, ActionSpec::wait()));

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(session.request_stop());
        handle.await.unwrap();

        assert_eq!(session.stop_reason(), Some(StopReason::Manual));
        assert!(!session.is_active());
        // Stopping a stopped session reports false.
        assert!(!session.request_stop());
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_accumulate_on_transitions() {
        let session = Arc::new(RecordingSession::new(
            &ActionSpec::wait(),
            params(500, 100, 500),
        ));
        let host = Arc::new(ScriptedHost::new(&["ready", "loading...", "ready again"]));

        run_to_completion(&session, host).await;

        let info = session.info();
        let kinds: Vec<EventKind> = info.events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::LoadingStarted, EventKind::LoadingEnded]);
        assert!(info.events[0].relative_time_ms < info.events[1].relative_time_ms);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_params_are_redacted() {
        let action = ActionSpec {
            kind: crate::host::ActionKind::Type,
            target_ref: Some("e1".to_string()),
            text: Some("secret input".to_string()),
            ..ActionSpec::wait()
        };
        let session = Arc::new(RecordingSession::new(&action, params(200, 100, 200)));
        let host: Arc<dyn AutomationHost> = Arc::new(ScriptedHost::new(&["page"]));
        tokio::spawn(Arc::clone(&session).run(host, action))
            .await
            .unwrap();

        assert_eq!(session.info().trigger.text.as_deref(), Some("[redacted]"));
    }
}
