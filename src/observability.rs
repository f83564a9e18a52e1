// src/observability.rs
//! Tracing initialization
//!
//! All components log through `tracing`: cache eviction and expiry at
//! debug, session lifecycle at info, capture skips at debug. The hosting
//! process calls `init_tracing` once at startup; repeated calls are no-ops.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber
///
/// Filter comes from `RUST_LOG`, defaulting to `info`. Returns Ok even if a
/// subscriber is already installed so embedding hosts can call this freely.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }

    Ok(())
}
