// src/cache/entry.rs
//! Cache entry model
//!
//! One oversized output stored for later paginated or searched retrieval.
//! Owned exclusively by the cache instance that created it; never mutated
//! after insertion.

use chrono::{DateTime, Utc};

/// A cached oversized output
#[derive(Debug)]
pub struct CacheEntry {
    /// Opaque unique key handed back to the caller
    pub key: String,

    /// Original text exactly as submitted
    pub raw_text: String,

    /// Line index of `raw_text`, in order
    pub lines: Vec<String>,

    /// Caller-supplied label describing where the output came from
    pub source_label: String,

    /// Insertion time
    pub created_at: DateTime<Utc>,

    /// Time after which the entry is no longer retrievable
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Build an entry from raw text, splitting the line index eagerly so
    /// pagination and search never re-split
    pub fn new(
        key: String,
        raw_text: String,
        source_label: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let lines = raw_text.lines().map(str::to_string).collect();
        Self {
            key,
            raw_text,
            lines,
            source_label,
            created_at,
            expires_at,
        }
    }

    /// Total number of indexed lines
    pub fn total_lines(&self) -> usize {
        self.lines.len()
    }

    /// Inclusive 1-indexed line window, clamped to the available range
    ///
    /// A start beyond the last line yields an empty slice.
    pub fn line_window(&self, start_line: usize, end_line: usize) -> &[String] {
        let total = self.lines.len();
        if start_line == 0 || start_line > total || start_line > end_line {
            return &[];
        }
        let end = end_line.min(total);
        &self.lines[start_line - 1..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn entry(text: &str) -> CacheEntry {
        let now = Utc::now();
        CacheEntry::new(
            "k_1".to_string(),
            text.to_string(),
            "test".to_string(),
            now,
            now + Duration::seconds(60),
        )
    }

    #[test]
    fn test_line_index() {
        let e = entry("a\nb\nc");
        assert_eq!(e.total_lines(), 3);
        assert_eq!(e.lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_full_window_reconstructs_text() {
        let e = entry("a\nb\nc");
        assert_eq!(e.line_window(1, e.total_lines()).join("\n"), "a\nb\nc");
    }

    proptest! {
        #[test]
        fn prop_full_window_reconstructs_any_text(
            mut lines in prop::collection::vec("[^\\r\\n]{0,40}", 0..49),
            // A trailing empty line would not survive the line split, so
            // the last line is kept non-empty.
            last in "[^\\r\\n]{1,40}",
        ) {
            lines.push(last);
            let text = lines.join("\n");
            let e = entry(&text);
            prop_assert_eq!(e.total_lines(), lines.len());
            prop_assert_eq!(e.line_window(1, lines.len()).join("\n"), text);
        }
    }

    #[test]
    fn test_line_window_clamps() {
        let e = entry("a\nb\nc");
        assert_eq!(e.line_window(1, 2), ["a", "b"]);
        assert_eq!(e.line_window(2, 100), ["b", "c"]);
        assert!(e.line_window(4, 10).is_empty());
        assert!(e.line_window(3, 2).is_empty());
    }
}
