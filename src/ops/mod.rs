// src/ops/mod.rs
//! Engine facade
//!
//! Pure request/response operations exposed to the (external) tool-dispatch
//! layer. The `Engine` owns the three output caches, the recording
//! registry, and a handle to the automation host; nothing here keeps side
//! channels, so every call is answerable from the request alone.

use crate::cache::store::{CacheStats, OutputKind, PageView, PutReceipt, ResponseCache, SearchView};
use crate::diff::DiffResult;
use crate::host::{ActionKind, ActionSpec, AutomationHost};
use crate::recording::content_store::RecordingSearchView;
use crate::recording::registry::RecordingRegistry;
use crate::recording::session::{RecordingInfo, RecordingSession, SessionParams, StopReason};
use crate::utils::config::{EngineConfig, RecordingConfig};
use crate::utils::errors::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Request to start a recording
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecordingRequest {
    /// Triggering action, validated before anything is created
    pub action: ActionSpec,

    /// Recording window; clamped to the configured maximum
    #[serde(default)]
    pub duration_ms: Option<u64>,

    /// Capture interval; floored to the configured minimum
    #[serde(default)]
    pub interval_ms: Option<u64>,

    /// Idle stop threshold; clamped to the effective duration
    #[serde(default)]
    pub idle_threshold_ms: Option<u64>,
}

/// Response to `create_recording`
#[derive(Debug, Clone, Serialize)]
pub struct CreateRecordingResponse {
    pub recording_id: String,
}

/// One row of `list_recordings`
#[derive(Debug, Clone, Serialize)]
pub struct RecordingSummary {
    pub id: String,
    pub trigger_kind: ActionKind,
    pub started_at: DateTime<Utc>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    pub snapshot_count: usize,
    pub event_count: usize,
}

/// One paginated snapshot view
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotPage {
    /// Snapshot index within the recording
    pub index: usize,

    /// Milliseconds since the recording started
    pub captured_at_ms: u64,

    #[serde(flatten)]
    pub page: PageView,
}

/// The response-handling engine core
pub struct Engine {
    state_dumps: ResponseCache,
    operation_logs: ResponseCache,
    message_logs: ResponseCache,
    registry: RecordingRegistry,
    recording_config: RecordingConfig,
    host: Arc<dyn AutomationHost>,
}

impl Engine {
    /// Build an engine over one automation host
    pub fn new(config: EngineConfig, host: Arc<dyn AutomationHost>) -> Self {
        Self {
            state_dumps: ResponseCache::new(OutputKind::StateDump, config.state_dumps),
            operation_logs: ResponseCache::new(OutputKind::OperationLog, config.operation_logs),
            message_logs: ResponseCache::new(OutputKind::MessageLog, config.message_logs),
            registry: RecordingRegistry::new(config.recording.registry_capacity),
            recording_config: config.recording,
            host,
        }
    }

    fn cache(&self, kind: OutputKind) -> &ResponseCache {
        match kind {
            OutputKind::StateDump => &self.state_dumps,
            OutputKind::OperationLog => &self.operation_logs,
            OutputKind::MessageLog => &self.message_logs,
        }
    }

    // ---- Cache operations -------------------------------------------------

    /// Whether an output of this kind is large enough to cache
    pub fn needs_caching(&self, kind: OutputKind, text: &str) -> bool {
        self.cache(kind).needs_caching(text)
    }

    /// Store an oversized output; returns key, line count, and preview
    pub fn cache_output(&self, kind: OutputKind, text: &str, label: &str) -> PutReceipt {
        self.cache(kind).put(text, label)
    }

    /// Read a line range of a cached output
    pub fn paginate_cached(
        &self,
        kind: OutputKind,
        key: &str,
        start_line: Option<usize>,
        end_line: Option<usize>,
    ) -> Result<PageView> {
        self.cache(kind).paginate(key, start_line, end_line)
    }

    /// Search a cached output
    pub fn search_cached(
        &self,
        kind: OutputKind,
        key: &str,
        query: &str,
        max_results: usize,
    ) -> Result<SearchView> {
        self.cache(kind).search(key, query, max_results)
    }

    /// Counters for one cache instance
    pub fn cache_stats(&self, kind: OutputKind) -> CacheStats {
        self.cache(kind).stats()
    }

    // ---- Recording operations ---------------------------------------------

    /// Validate the action, register a session, and spawn its capture task
    pub fn create_recording(&self, request: CreateRecordingRequest) -> Result<CreateRecordingResponse> {
        request.action.validate()?;

        let params = SessionParams::clamped(
            &self.recording_config,
            request.duration_ms,
            request.interval_ms,
            request.idle_threshold_ms,
        );
        let session = Arc::new(RecordingSession::new(&request.action, params));
        let recording_id = session.id().to_string();

        self.registry.insert(Arc::clone(&session));
        tokio::spawn(session.run(Arc::clone(&self.host), request.action));

        info!(id = %recording_id, "created recording");
        Ok(CreateRecordingResponse { recording_id })
    }

    /// Full state view of one recording
    pub fn get_recording_info(&self, id: &str) -> Result<RecordingInfo> {
        Ok(self.registry.get(id)?.info())
    }

    /// Summaries of all live recordings, oldest first
    pub fn list_recordings(&self) -> Vec<RecordingSummary> {
        self.registry
            .list()
            .iter()
            .map(|session| {
                let info = session.info();
                RecordingSummary {
                    id: info.id,
                    trigger_kind: info.trigger.kind,
                    started_at: info.started_at,
                    is_active: info.is_active,
                    stop_reason: info.stop_reason,
                    snapshot_count: info.snapshot_count,
                    event_count: info.events.len(),
                }
            })
            .collect()
    }

    /// Request a manual stop of an active recording
    pub fn stop_recording(&self, id: &str) -> Result<()> {
        self.registry.get(id)?.request_stop();
        Ok(())
    }

    /// Delete one recording, stopping its loop and dropping its snapshots
    pub fn delete_recording(&self, id: &str) -> Result<()> {
        self.registry.delete(id)
    }

    /// Diff two snapshots of one recording
    pub fn diff_snapshots(&self, id: &str, from_index: usize, to_index: usize) -> Result<DiffResult> {
        self.registry.get(id)?.diff_snapshots(from_index, to_index)
    }

    /// Read a line range of one stored snapshot
    pub fn get_snapshot(
        &self,
        id: &str,
        index: usize,
        start_line: Option<usize>,
        end_line: Option<usize>,
    ) -> Result<SnapshotPage> {
        let session = self.registry.get(id)?;
        let snapshot = session.store().get(index)?;
        let page = session.store().paginate(index, start_line, end_line)?;
        Ok(SnapshotPage {
            index,
            captured_at_ms: snapshot.captured_at_ms,
            page,
        })
    }

    /// Search across all snapshots of one recording
    pub fn search_recording(
        &self,
        id: &str,
        query: &str,
        max_results: usize,
    ) -> Result<RecordingSearchView> {
        self.registry.get(id)?.store().search(query, max_results)
    }

    /// Reclaim everything: cache entries, expiry timers, and recordings
    pub fn shutdown(&self) {
        info!("shutting down engine");
        self.state_dumps.clear();
        self.operation_logs.clear();
        self.message_logs.clear();
        self.registry.delete_all();
    }
}
