// src/lib.rs
//! Pagetrail Engine Library
//!
//! Response-handling core for tool-calling automation hosts. Oversized tool
//! outputs land in bounded, expiring caches that are paginated and searched
//! instead of returned in full; a triggering action can start a time-boxed
//! recording of state snapshots so transient UI changes are inspectable
//! after the fact via diffing and full-text search.
//!
//! # Architecture
//!
//! - **cache**: expiring keyed caches for the three oversized output kinds
//! - **diff**: line-set and tagged-element snapshot diffing
//! - **host**: interface to the external automation collaborator
//! - **recording**: snapshot capture sessions, event detection, registry
//! - **ops**: the request/response facade the tool-dispatch layer calls
//! - **observability**: tracing setup
//! - **utils**: errors, configuration, content hashing

// Public module exports
pub mod cache;
pub mod diff;
pub mod host;
pub mod observability;
pub mod ops;
pub mod recording;
pub mod utils;

// Re-export commonly used types
pub use cache::{OutputKind, ResponseCache};
pub use host::{ActionKind, ActionSpec, AutomationHost};
pub use ops::{CreateRecordingRequest, Engine};
pub use recording::{RecordingRegistry, RecordingSession, StopReason};
pub use utils::config::EngineConfig;
pub use utils::errors::{EngineError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
