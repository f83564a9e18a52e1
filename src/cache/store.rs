// src/cache/store.rs
//! Expiring keyed cache store
//!
//! Bounded map from an opaque key to a cached text blob plus metadata.
//! Eviction is strict FIFO by insertion order (reads never promote an
//! entry); expiry is a per-entry timer task that removes the entry after a
//! fixed duration from insertion. The timer handle is kept so explicit
//! deletion can cancel it, preventing a stale eviction from firing against
//! a reused key.
//!
//! A paginate or search racing a concurrent eviction observes the same
//! outcome as a normal expiry: `NotFound`.

use crate::cache::entry::CacheEntry;
use crate::cache::preview::{clip, structure_preview, PreviewLine};
use crate::utils::config::CacheConfig;
use crate::utils::errors::{EngineError, Result};
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;
use ulid::Ulid;

/// The three output kinds served by independent cache instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Full-page state dumps
    StateDump,

    /// Free-form operational logs
    OperationLog,

    /// Structured message logs
    MessageLog,
}

impl OutputKind {
    /// Key prefix, so keys are self-describing in logs and tool output
    fn key_prefix(self) -> &'static str {
        match self {
            OutputKind::StateDump => "state",
            OutputKind::OperationLog => "oplog",
            OutputKind::MessageLog => "msglog",
        }
    }
}

/// Receipt returned by `put`
#[derive(Debug, Clone, Serialize)]
pub struct PutReceipt {
    /// Fresh unique key for later pagination and search
    pub key: String,

    /// Total line count of the stored text
    pub total_lines: usize,

    /// Highlighted lines for immediate display without pagination
    pub preview: Vec<PreviewLine>,
}

/// One page of a cached entry
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    /// Requested lines joined with newlines
    pub content: String,

    /// Effective 1-based inclusive start line
    pub start_line: usize,

    /// Effective 1-based inclusive end line (0 when the page is empty)
    pub end_line: usize,

    /// Total line count of the entry
    pub total_lines: usize,

    /// True when lines remain after `end_line`
    pub has_more: bool,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    /// 1-based line number of the match
    pub line: usize,

    /// Matched line text, possibly truncated
    pub content: String,
}

/// Search response
#[derive(Debug, Clone, Serialize)]
pub struct SearchView {
    /// Matches in line order, capped at the requested maximum
    pub matches: Vec<SearchMatch>,

    /// True match count, ignoring the cap
    pub total_matches: usize,
}

/// Cache counters
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Live entries
    pub entries: usize,

    /// Total entries inserted
    pub inserted_total: u64,

    /// Entries removed by capacity eviction
    pub evicted_total: u64,

    /// Entries removed by expiry timers
    pub expired_total: u64,
}

/// Expiring keyed cache for one output kind
pub struct ResponseCache {
    kind: OutputKind,
    config: CacheConfig,
    entries: Arc<DashMap<String, Arc<CacheEntry>>>,

    /// Insertion order for strict FIFO eviction
    order: Arc<Mutex<VecDeque<String>>>,

    /// Expiry timer per live key, cancelled on explicit removal
    timers: Arc<DashMap<String, JoinHandle<()>>>,

    inserted: AtomicU64,
    evicted: AtomicU64,
    expired: Arc<AtomicU64>,
}

impl ResponseCache {
    /// Create an empty cache for one output kind
    pub fn new(kind: OutputKind, config: CacheConfig) -> Self {
        Self {
            kind,
            config,
            entries: Arc::new(DashMap::new()),
            order: Arc::new(Mutex::new(VecDeque::new())),
            timers: Arc::new(DashMap::new()),
            inserted: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
            expired: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Which output kind this instance serves
    pub fn kind(&self) -> OutputKind {
        self.kind
    }

    /// Whether an output is large enough to cache instead of returning
    /// inline. The decision point callers use before `put`.
    pub fn needs_caching(&self, text: &str) -> bool {
        text.lines().count() > self.config.threshold_lines
    }

    /// Store a text blob; returns the key, line count, and preview
    ///
    /// At capacity the single oldest-inserted entry is evicted first.
    /// Removal after the configured TTL is scheduled on the tokio timer.
    pub fn put(&self, text: &str, source_label: &str) -> PutReceipt {
        let key = format!("{}_{}", self.kind.key_prefix(), Ulid::new());
        let now = Utc::now();
        let entry = Arc::new(CacheEntry::new(
            key.clone(),
            text.to_string(),
            source_label.to_string(),
            now,
            now + chrono::Duration::from_std(self.config.ttl)
                .unwrap_or_else(|_| chrono::Duration::zero()),
        ));

        {
            let mut order = self.order.lock();
            while order.len() >= self.config.capacity {
                if let Some(oldest) = order.pop_front() {
                    if self.remove_entry(&oldest) {
                        self.evicted.fetch_add(1, Ordering::Relaxed);
                        debug!(kind = ?self.kind, key = %oldest, "evicted oldest cache entry");
                    }
                } else {
                    break;
                }
            }
            order.push_back(key.clone());
        }

        let total_lines = entry.total_lines();
        let preview = structure_preview(
            &entry.lines,
            self.config.preview_lines,
            self.config.search_snippet_chars,
        );

        self.entries.insert(key.clone(), entry);
        self.inserted.fetch_add(1, Ordering::Relaxed);
        self.schedule_expiry(key.clone());
        debug!(kind = ?self.kind, key = %key, total_lines, "cached oversized output");

        PutReceipt {
            key,
            total_lines,
            preview,
        }
    }

    /// Read a 1-indexed inclusive line range of a cached entry
    ///
    /// `end_line` defaults to `start_line + page_size - 1`, clamped to the
    /// total. Fails with `NotFound` when the key is absent or expired.
    pub fn paginate(
        &self,
        key: &str,
        start_line: Option<usize>,
        end_line: Option<usize>,
    ) -> Result<PageView> {
        let start_line = start_line.unwrap_or(1);
        if start_line < 1 {
            return Err(EngineError::InvalidArgument(
                "start_line must be at least 1".to_string(),
            ));
        }
        let end_line = end_line.unwrap_or(start_line + self.config.page_size - 1);
        if end_line < start_line {
            return Err(EngineError::InvalidArgument(format!(
                "end_line {} precedes start_line {}",
                end_line, start_line
            )));
        }

        let entry = self.get_entry(key)?;
        let total_lines = entry.total_lines();
        let window = entry.line_window(start_line, end_line);
        let effective_end = if window.is_empty() {
            0
        } else {
            start_line + window.len() - 1
        };

        Ok(PageView {
            content: window.join("\n"),
            start_line,
            end_line: effective_end,
            total_lines,
            has_more: effective_end < total_lines && !window.is_empty(),
        })
    }

    /// Case-insensitive substring search over stored lines, in order
    ///
    /// Collecting stops at `max_results`, counting does not, so
    /// `total_matches` is exact.
    pub fn search(&self, key: &str, query: &str, max_results: usize) -> Result<SearchView> {
        if query.is_empty() {
            return Err(EngineError::InvalidArgument(
                "search query must not be empty".to_string(),
            ));
        }
        let entry = self.get_entry(key)?;

        let needle = query.to_lowercase();
        let mut matches = Vec::new();
        let mut total_matches = 0;
        for (i, line) in entry.lines.iter().enumerate() {
            if line.to_lowercase().contains(&needle) {
                total_matches += 1;
                if matches.len() < max_results {
                    matches.push(SearchMatch {
                        line: i + 1,
                        content: clip(line, self.config.search_snippet_chars),
                    });
                }
            }
        }

        Ok(SearchView {
            matches,
            total_matches,
        })
    }

    /// Remove one entry explicitly, cancelling its expiry timer
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.remove_entry(key);
        if removed {
            self.order.lock().retain(|k| k != key);
            debug!(kind = ?self.kind, key = %key, "deleted cache entry");
        }
        removed
    }

    /// Drop all entries and cancel all timers
    pub fn clear(&self) {
        for timer in self.timers.iter() {
            timer.value().abort();
        }
        self.timers.clear();
        self.entries.clear();
        self.order.lock().clear();
    }

    /// Current counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            inserted_total: self.inserted.load(Ordering::Relaxed),
            evicted_total: self.evicted.load(Ordering::Relaxed),
            expired_total: self.expired.load(Ordering::Relaxed),
        }
    }

    fn get_entry(&self, key: &str) -> Result<Arc<CacheEntry>> {
        self.entries
            .get(key)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| EngineError::not_found("cache key", key))
    }

    /// Remove the entry and abort its timer. Does not touch `order`; the
    /// capacity path has already popped the key and the delete path
    /// retains around it.
    fn remove_entry(&self, key: &str) -> bool {
        if let Some((_, timer)) = self.timers.remove(key) {
            timer.abort();
        }
        self.entries.remove(key).is_some()
    }

    fn schedule_expiry(&self, key: String) {
        let ttl = self.config.ttl;
        let entries = Arc::clone(&self.entries);
        let order = Arc::clone(&self.order);
        let timers = Arc::clone(&self.timers);
        let expired = Arc::clone(&self.expired);
        let kind = self.kind;

        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let key = task_key;
            tokio::time::sleep(ttl).await;
            if entries.remove(&key).is_some() {
                order.lock().retain(|k| k != &key);
                expired.fetch_add(1, Ordering::Relaxed);
                debug!(?kind, key = %key, "cache entry expired");
            }
            timers.remove(&key);
        });
        self.timers.insert(key, handle);
    }
}

impl Drop for ResponseCache {
    fn drop(&mut self) {
        for timer in self.timers.iter() {
            timer.value().abort();
        }
    }
}
