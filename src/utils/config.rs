// src/utils/config.rs
//! Engine configuration
//!
//! Plain structs with defaults; the hosting process decides where the
//! values come from. Clamping rules live next to the knobs they bound.

use std::time::Duration;

/// Configuration for one expiring output cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Line count above which an output is cached instead of returned inline
    pub threshold_lines: usize,

    /// Maximum number of live entries; the oldest insertion is evicted first
    pub capacity: usize,

    /// Time an entry stays retrievable after insertion
    pub ttl: Duration,

    /// Default number of lines per pagination page
    pub page_size: usize,

    /// Maximum number of lines in the structure preview returned by `put`
    pub preview_lines: usize,

    /// Maximum characters of a matched line echoed back by `search`
    pub search_snippet_chars: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            threshold_lines: 100,
            capacity: 10,
            ttl: Duration::from_secs(300),
            page_size: 100,
            preview_lines: 20,
            search_snippet_chars: 200,
        }
    }
}

/// Configuration for recording sessions and their registry
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Recording duration when the caller does not specify one
    pub default_duration_ms: u64,

    /// Hard cap on recording duration; longer requests are silently clamped
    pub max_duration_ms: u64,

    /// Capture interval when the caller does not specify one
    pub default_interval_ms: u64,

    /// Minimum capture interval; below this, capture overhead would
    /// dominate the signal being measured
    pub min_interval_ms: u64,

    /// Stop a recording after this long without an observed content change
    pub default_idle_threshold_ms: u64,

    /// Maximum snapshots per session; reaching it stops the session
    pub max_snapshots: usize,

    /// Maximum live sessions; the oldest is deleted when a new one is
    /// created over capacity
    pub registry_capacity: usize,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: 10_000,
            max_duration_ms: 30_000,
            default_interval_ms: 100,
            min_interval_ms: 50,
            default_idle_threshold_ms: 2_000,
            max_snapshots: 200,
            registry_capacity: 5,
        }
    }
}

impl RecordingConfig {
    /// Effective duration for a session: requested or default, capped
    pub fn clamp_duration_ms(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_duration_ms)
            .min(self.max_duration_ms)
    }

    /// Effective capture interval: requested or default, floored
    pub fn clamp_interval_ms(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_interval_ms)
            .max(self.min_interval_ms)
    }

    /// Effective idle threshold: requested or default, never longer than
    /// the effective duration (an idle window the recording can't reach
    /// degenerates to a timeout stop)
    pub fn clamp_idle_threshold_ms(&self, requested: Option<u64>, duration_ms: u64) -> u64 {
        requested
            .unwrap_or(self.default_idle_threshold_ms)
            .min(duration_ms)
    }
}

/// Top-level engine configuration
///
/// One cache config per output kind; all default identically but are
/// independently tunable.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Cache for full-state dumps
    pub state_dumps: CacheConfig,

    /// Cache for free-form operational logs
    pub operation_logs: CacheConfig,

    /// Cache for structured message logs
    pub message_logs: CacheConfig,

    /// Recording session and registry tuning
    pub recording: RecordingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_clamp() {
        let config = RecordingConfig::default();
        assert_eq!(config.clamp_duration_ms(None), 10_000);
        assert_eq!(config.clamp_duration_ms(Some(5_000)), 5_000);
        assert_eq!(config.clamp_duration_ms(Some(60_000)), 30_000);
    }

    #[test]
    fn test_interval_clamp() {
        let config = RecordingConfig::default();
        assert_eq!(config.clamp_interval_ms(None), 100);
        assert_eq!(config.clamp_interval_ms(Some(10)), 50);
        assert_eq!(config.clamp_interval_ms(Some(250)), 250);
    }

    #[test]
    fn test_idle_threshold_never_exceeds_duration() {
        let config = RecordingConfig::default();
        assert_eq!(config.clamp_idle_threshold_ms(None, 500), 500);
        assert_eq!(config.clamp_idle_threshold_ms(Some(50), 500), 50);
        assert_eq!(config.clamp_idle_threshold_ms(Some(5_000), 10_000), 5_000);
    }
}
