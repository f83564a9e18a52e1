// src/cache/mod.rs
//! Expiring keyed output caches
//!
//! Oversized tool outputs are stored here instead of being returned in
//! full. One generic implementation serves three independent instances,
//! one per output kind:
//!
//! - **StateDump**: full-page state dumps
//! - **OperationLog**: free-form operational logs
//! - **MessageLog**: structured message logs
//!
//! Each cache is a bounded map from an opaque key to a text blob plus
//! metadata, with strict-FIFO capacity eviction, per-entry expiry timers,
//! line-indexed pagination, and case-insensitive substring search.

pub mod entry;
pub mod preview;
pub mod store;

// Re-export commonly used types
pub use entry::CacheEntry;
pub use preview::PreviewLine;
pub use store::{CacheStats, OutputKind, PageView, PutReceipt, ResponseCache, SearchMatch, SearchView};
