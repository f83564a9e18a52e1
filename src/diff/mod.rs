// src/diff/mod.rs
//! Snapshot diffing
//!
//! Compares two snapshot texts two ways:
//!
//! - **Line-set diff**: set-membership comparison of line texts. Reordering
//!   unchanged lines produces no noise; the flip side is that a line removed
//!   and reinserted elsewhere with identical text produces no entry at all.
//!   That is a documented limitation of the scheme, not a defect.
//! - **Tagged-element diff**: lines carrying a stable inline element
//!   identifier are tracked across snapshots, so an element whose text
//!   changed shows up as a single `changed` entry instead of an unrelated
//!   add/remove pair.
//!
//! Both comparisons are pure functions over the two inputs. Output per
//! category is capped to bound response size; the `total_*` counts always
//! reflect the true uncapped totals.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Cap on reported entries per category (added/removed/changed)
pub const MAX_ENTRIES_PER_CATEGORY: usize = 30;

/// One added or removed line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineEntry {
    /// 1-based line number in the snapshot the line belongs to: the `to`
    /// snapshot for added lines, the `from` snapshot for removed lines
    pub line: usize,

    /// Full line text
    pub text: String,
}

/// One tagged element whose text changed between snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementChange {
    /// Stable inline identifier shared by both sides
    pub element_id: String,

    /// Line text in the `from` snapshot
    pub from: String,

    /// Line text in the `to` snapshot
    pub to: String,
}

/// Result of diffing two snapshots
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiffResult {
    /// Lines present in `to` but not in `from` (capped)
    pub added: Vec<LineEntry>,

    /// Lines present in `from` but not in `to` (capped)
    pub removed: Vec<LineEntry>,

    /// Tagged elements present on both sides with differing text (capped)
    pub changed: Vec<ElementChange>,

    /// True count of added lines, ignoring the cap
    pub total_added: usize,

    /// True count of removed lines, ignoring the cap
    pub total_removed: usize,

    /// True count of changed elements, ignoring the cap
    pub total_changed: usize,
}

impl DiffResult {
    /// True when nothing differs between the two snapshots
    pub fn is_empty(&self) -> bool {
        self.total_added == 0 && self.total_removed == 0 && self.total_changed == 0
    }
}

/// Diff two snapshot texts
pub fn diff(from: &str, to: &str) -> DiffResult {
    let from_lines: Vec<&str> = from.lines().collect();
    let to_lines: Vec<&str> = to.lines().collect();

    let from_set: HashSet<&str> = from_lines.iter().copied().collect();
    let to_set: HashSet<&str> = to_lines.iter().copied().collect();

    let mut result = DiffResult::default();
    let mut seen_added: HashSet<&str> = HashSet::new();
    let mut seen_removed: HashSet<&str> = HashSet::new();

    for (i, line) in to_lines.iter().enumerate() {
        if !from_set.contains(line) && seen_added.insert(line) {
            result.total_added += 1;
            if result.added.len() < MAX_ENTRIES_PER_CATEGORY {
                result.added.push(LineEntry {
                    line: i + 1,
                    text: (*line).to_string(),
                });
            }
        }
    }

    for (i, line) in from_lines.iter().enumerate() {
        if !to_set.contains(line) && seen_removed.insert(line) {
            result.total_removed += 1;
            if result.removed.len() < MAX_ENTRIES_PER_CATEGORY {
                result.removed.push(LineEntry {
                    line: i + 1,
                    text: (*line).to_string(),
                });
            }
        }
    }

    let from_elements = element_map(&from_lines);
    let to_elements = element_map(&to_lines);

    // Deterministic order: walk `to` lines, not the hash map.
    let mut reported: HashSet<&str> = HashSet::new();
    for line in &to_lines {
        let Some(id) = element_id(line) else { continue };
        if !reported.insert(id) {
            continue;
        }
        let (Some(from_text), Some(to_text)) = (from_elements.get(id), to_elements.get(id)) else {
            // Present on one side only: already surfaced by the line-set diff.
            continue;
        };
        if from_text != to_text {
            result.total_changed += 1;
            if result.changed.len() < MAX_ENTRIES_PER_CATEGORY {
                result.changed.push(ElementChange {
                    element_id: id.to_string(),
                    from: (*from_text).to_string(),
                    to: (*to_text).to_string(),
                });
            }
        }
    }

    result
}

/// Map from element identifier to full line text; last occurrence wins
fn element_map<'a>(lines: &[&'a str]) -> HashMap<&'a str, &'a str> {
    let mut map = HashMap::new();
    for line in lines {
        if let Some(id) = element_id(line) {
            map.insert(id, *line);
        }
    }
    map
}

/// Extract a stable inline element identifier from a snapshot line
///
/// Recognizes the host snapshot formats' markers, checked in order:
/// `[ref=<token>]` and `uid=<token>`.
pub fn element_id(line: &str) -> Option<&str> {
    if let Some(start) = line.find("[ref=") {
        let rest = &line[start + 5..];
        if let Some(end) = rest.find(']') {
            let id = &rest[..end];
            if !id.is_empty() {
                return Some(id);
            }
        }
    }
    if let Some(start) = line.find("uid=") {
        let rest = &line[start + 4..];
        let end = rest
            .find(|c: char| c.is_whitespace() || c == ']' || c == '"' || c == '>')
            .unwrap_or(rest.len());
        let id = &rest[..end];
        if !id.is_empty() {
            return Some(id);
        }
    }
    None
}
