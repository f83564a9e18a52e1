// src/recording/events.rs
//! Heuristic significant-event detection
//!
//! Inspects two consecutive snapshots for keyword transitions and emits
//! timestamped events. The rule table is an explicitly ordered list of
//! keyword groups; detection is best-effort string matching and
//! order-sensitive, nothing more. At most one event per group per
//! comparison, first matching keyword wins.

use once_cell::sync::Lazy;
use serde::Serialize;

/// Event kinds a detector can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    LoadingStarted,
    LoadingEnded,
    DialogAppeared,
    DialogClosed,
    ErrorAppeared,
}

/// One detected transition
#[derive(Debug, Clone, Serialize)]
pub struct SignificantEvent {
    /// Milliseconds since the recording started
    pub relative_time_ms: u64,

    /// What kind of transition was observed
    pub kind: EventKind,

    /// The keyword that matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// One keyword group and the events its transitions map to
struct SignalGroup {
    /// Keywords checked in order; the first with a transition wins
    keywords: &'static [&'static str],

    /// Emitted on absent-then-present
    appeared: EventKind,

    /// Emitted on present-then-absent; groups without a "resolved" signal
    /// track appearance only
    disappeared: Option<EventKind>,
}

/// Ordered rule table. Order matters: earlier groups are reported first.
static SIGNAL_GROUPS: Lazy<Vec<SignalGroup>> = Lazy::new(|| {
    vec![
        SignalGroup {
            keywords: &["loading", "spinner", "please wait"],
            appeared: EventKind::LoadingStarted,
            disappeared: Some(EventKind::LoadingEnded),
        },
        SignalGroup {
            keywords: &["dialog", "modal", "popup"],
            appeared: EventKind::DialogAppeared,
            disappeared: Some(EventKind::DialogClosed),
        },
        SignalGroup {
            keywords: &["error", "failed", "exception"],
            appeared: EventKind::ErrorAppeared,
            disappeared: None,
        },
    ]
});

/// Detect significant transitions between two consecutive snapshots
///
/// Pure and stateless; case-insensitive containment over the full texts.
pub fn detect_events(previous: &str, current: &str, relative_time_ms: u64) -> Vec<SignificantEvent> {
    let previous = previous.to_lowercase();
    let current = current.to_lowercase();

    let mut events = Vec::new();
    for group in SIGNAL_GROUPS.iter() {
        for keyword in group.keywords {
            let was_present = previous.contains(keyword);
            let is_present = current.contains(keyword);

            let kind = if !was_present && is_present {
                Some(group.appeared)
            } else if was_present && !is_present {
                group.disappeared
            } else {
                None
            };

            if let Some(kind) = kind {
                events.push(SignificantEvent {
                    relative_time_ms,
                    kind,
                    detail: Some((*keyword).to_string()),
                });
                break;
            }
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_started() {
        let events = detect_events("page ready", "loading...", 100);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::LoadingStarted);
        assert_eq!(events[0].relative_time_ms, 100);
        assert_eq!(events[0].detail.as_deref(), Some("loading"));
    }

    #[test]
    fn test_loading_ended() {
        let events = detect_events("loading...", "page ready", 200);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::LoadingEnded);
    }

    #[test]
    fn test_no_transition_no_events() {
        assert!(detect_events("loading...", "loading...", 0).is_empty());
        assert!(detect_events("plain", "plain text", 0).is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let events = detect_events("ok", "LOADING", 0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::LoadingStarted);
    }

    #[test]
    fn test_at_most_one_event_per_group() {
        // Both "loading" and "spinner" appear; only the first keyword is
        // reported.
        let events = detect_events("ok", "loading spinner", 0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].detail.as_deref(), Some("loading"));
    }

    #[test]
    fn test_error_has_no_resolved_signal() {
        assert!(detect_events("error: boom", "all good", 0).is_empty());
        let events = detect_events("all good", "error: boom", 0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::ErrorAppeared);
    }

    #[test]
    fn test_independent_groups_all_report() {
        let events = detect_events("ok", "loading... modal open error", 50);
        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::LoadingStarted,
                EventKind::DialogAppeared,
                EventKind::ErrorAppeared
            ]
        );
    }

    #[test]
    fn test_dialog_closed() {
        let events = detect_events("confirm dialog shown", "page ready", 10);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::DialogClosed);
    }
}
