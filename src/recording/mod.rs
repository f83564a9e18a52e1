// src/recording/mod.rs
//! Recording of post-action state changes
//!
//! A recording performs one triggering action, then captures snapshots of
//! target state at a fixed interval until a stop condition fires, so
//! transient UI changes (spinners, dialogs, errors) can be inspected after
//! the fact:
//!
//! - **Content Store**: append-only snapshot storage for one recording
//! - **Events**: heuristic detector for significant transitions
//! - **Session**: the per-recording state machine and capture loop
//! - **Registry**: bounded collection of sessions with FIFO eviction
//!
//! # Control flow
//!
//! ```text
//! create_recording → Registry → Session
//!                                  │ perform trigger action
//!                                  │ tick: capture → hash → diff/events
//!                                  │ stop: idle | timeout | manual |
//!                                  │       error | max_snapshots
//!                                  ▼
//!                            Content Store ← paginate / search / diff
//! ```

pub mod content_store;
pub mod events;
pub mod registry;
pub mod session;

// Re-export commonly used types
pub use content_store::{ContentStore, RecordingSearchMatch, RecordingSearchView, Snapshot};
pub use events::{detect_events, EventKind, SignificantEvent};
pub use registry::RecordingRegistry;
pub use session::{RecordingInfo, RecordingSession, SessionParams, SessionState, StopReason};
