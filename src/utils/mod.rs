// src/utils/mod.rs
//! Common utilities and helpers
//!
//! - **Errors**: Crate-wide error taxonomy and `Result` alias
//! - **Config**: Tunable configuration structs with sane defaults
//! - **Hash**: Fast content digest for snapshot change detection

pub mod config;
pub mod errors;
pub mod hash;

// Re-export commonly used types
pub use config::{CacheConfig, EngineConfig, RecordingConfig};
pub use errors::{EngineError, Result};
pub use hash::content_hash;
