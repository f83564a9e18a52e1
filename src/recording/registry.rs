// src/recording/registry.rs
//! Bounded registry of recording sessions
//!
//! Holds the live sessions for one engine, capped at a fixed capacity.
//! Creating a session over capacity deletes the single oldest-created one
//! (strict FIFO), stopping its loop and releasing its content store.

use crate::recording::session::RecordingSession;
use crate::utils::errors::{EngineError, Result};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};

/// Bounded session collection with FIFO eviction
pub struct RecordingRegistry {
    capacity: usize,
    sessions: DashMap<String, Arc<RecordingSession>>,

    /// Creation order, oldest first
    order: Mutex<VecDeque<String>>,
}

impl RecordingRegistry {
    /// Create an empty registry holding at most `capacity` sessions
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            sessions: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
        }
    }

    /// Register a session, evicting the oldest one when at capacity
    pub fn insert(&self, session: Arc<RecordingSession>) {
        let mut order = self.order.lock();
        while order.len() >= self.capacity {
            if let Some(oldest) = order.pop_front() {
                if let Some((_, evicted)) = self.sessions.remove(&oldest) {
                    evicted.request_stop();
                    info!(id = %oldest, "evicted oldest recording");
                }
            } else {
                break;
            }
        }
        order.push_back(session.id().to_string());
        self.sessions.insert(session.id().to_string(), session);
    }

    /// Session by id
    pub fn get(&self, id: &str) -> Result<Arc<RecordingSession>> {
        self.sessions
            .get(id)
            .map(|s| Arc::clone(s.value()))
            .ok_or_else(|| EngineError::not_found("recording", id))
    }

    /// All live sessions in creation order
    pub fn list(&self) -> Vec<Arc<RecordingSession>> {
        let order = self.order.lock();
        order
            .iter()
            .filter_map(|id| self.sessions.get(id).map(|s| Arc::clone(s.value())))
            .collect()
    }

    /// Delete one session, stopping its loop
    pub fn delete(&self, id: &str) -> Result<()> {
        let (_, session) = self
            .sessions
            .remove(id)
            .ok_or_else(|| EngineError::not_found("recording", id))?;
        session.request_stop();
        self.order.lock().retain(|k| k != id);
        debug!(id = %id, "deleted recording");
        Ok(())
    }

    /// Delete every session; used on whole-engine shutdown
    pub fn delete_all(&self) {
        for entry in self.sessions.iter() {
            entry.value().request_stop();
        }
        self.sessions.clear();
        self.order.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
