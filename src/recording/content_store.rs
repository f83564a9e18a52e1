// src/recording/content_store.rs
//! Append-only snapshot storage for one recording
//!
//! Owned by exactly one session; snapshots are never mutated after
//! creation and indices are contiguous from 0. Lives for the session's
//! lifetime and is reclaimed with it.

use crate::cache::store::PageView;
use crate::cache::preview::clip;
use crate::utils::errors::{EngineError, Result};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// Default page size for snapshot line windows
const DEFAULT_PAGE_LINES: usize = 100;

/// Characters of a matched line echoed back by search
const SEARCH_SNIPPET_CHARS: usize = 200;

/// One textual capture of target state at a point in time
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// 0-based index, monotonic within the recording
    pub index: usize,

    /// Captured text
    pub content: String,

    /// Content digest used for change detection
    pub content_hash: u64,

    /// Milliseconds since the recording started
    pub captured_at_ms: u64,
}

/// One search hit across a recording's snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordingSearchMatch {
    /// Snapshot the match was found in
    pub snapshot_index: usize,

    /// 1-based line number within that snapshot
    pub line: usize,

    /// Matched line text, possibly truncated
    pub content: String,
}

/// Search response over a recording
#[derive(Debug, Clone, Serialize)]
pub struct RecordingSearchView {
    /// Matches in snapshot/line order, capped at the requested maximum
    pub matches: Vec<RecordingSearchMatch>,

    /// True match count, ignoring the cap
    pub total_matches: usize,
}

/// Append-only snapshot sequence
pub struct ContentStore {
    snapshots: RwLock<Vec<Arc<Snapshot>>>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(Vec::new()),
        }
    }

    /// Append a snapshot, returning its index
    pub fn append(&self, content: String, content_hash: u64, captured_at_ms: u64) -> usize {
        let mut snapshots = self.snapshots.write();
        let index = snapshots.len();
        snapshots.push(Arc::new(Snapshot {
            index,
            content,
            content_hash,
            captured_at_ms,
        }));
        index
    }

    /// Snapshot by index
    pub fn get(&self, index: usize) -> Result<Arc<Snapshot>> {
        self.snapshots
            .read()
            .get(index)
            .cloned()
            .ok_or_else(|| EngineError::not_found("snapshot index", index))
    }

    /// Most recently appended snapshot, if any
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.snapshots.read().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.read().is_empty()
    }

    /// 1-indexed inclusive line window of one snapshot, with the same
    /// range semantics as cache pagination
    pub fn paginate(
        &self,
        index: usize,
        start_line: Option<usize>,
        end_line: Option<usize>,
    ) -> Result<PageView> {
        let start_line = start_line.unwrap_or(1);
        if start_line < 1 {
            return Err(EngineError::InvalidArgument(
                "start_line must be at least 1".to_string(),
            ));
        }
        let end_line = end_line.unwrap_or(start_line + DEFAULT_PAGE_LINES - 1);
        if end_line < start_line {
            return Err(EngineError::InvalidArgument(format!(
                "end_line {} precedes start_line {}",
                end_line, start_line
            )));
        }

        let snapshot = self.get(index)?;
        let lines: Vec<&str> = snapshot.content.lines().collect();
        let total_lines = lines.len();
        let window: &[&str] = if start_line > total_lines {
            &[]
        } else {
            &lines[start_line - 1..end_line.min(total_lines)]
        };
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

    /// Case-insensitive substring search across all snapshots, in
    /// snapshot then line order
    pub fn search(&self, query: &str, max_results: usize) -> Result<RecordingSearchView> {
        if query.is_empty() {
            return Err(EngineError::InvalidArgument(
                "search query must not be empty".to_string(),
            ));
        }

        let needle = query.to_lowercase();
        let mut matches = Vec::new();
        let mut total_matches = 0;
        for snapshot in self.snapshots.read().iter() {
            for (i, line) in snapshot.content.lines().enumerate() {
                if line.to_lowercase().contains(&needle) {
                    total_matches += 1;
                    if matches.len() < max_results {
                        matches.push(RecordingSearchMatch {
                            snapshot_index: snapshot.index,
                            line: i + 1,
                            content: clip(line, SEARCH_SNIPPET_CHARS),
                        });
                    }
                }
            }
        }

        Ok(RecordingSearchView {
            matches,
            total_matches,
        })
    }
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}
