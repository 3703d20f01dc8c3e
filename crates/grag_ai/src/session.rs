//! Explicit session store.
//!
//! Maps an opaque session id to one built graph handle plus running query
//! statistics. Entries expire after a period of inactivity and can be removed
//! explicitly; expiry is checked lazily on access and by `evict_expired`.
//! Statistics mutate the session entry, never the graph.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use grag_core::error::{codes, RagError};

use crate::graph::GraphHandle;

const DEFAULT_TTL_SECONDS: u64 = 1800;

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionStats {
    pub query_count: u64,
    pub avg_response_ms: f64,
    pub age_seconds: u64,
    pub idle_seconds: u64,
}

struct SessionEntry {
    handle: Arc<GraphHandle>,
    created_at: SystemTime,
    last_used: SystemTime,
    query_count: u64,
    total_response_ms: u64,
}

impl SessionEntry {
    fn expired(&self, ttl_seconds: u64) -> bool {
        let idle = SystemTime::now()
            .duration_since(self.last_used)
            .unwrap_or(Duration::from_secs(ttl_seconds + 1));
        idle.as_secs() >= ttl_seconds
    }
}

pub struct SessionStore {
    entries: Mutex<HashMap<String, SessionEntry>>,
    ttl_seconds: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL_SECONDS)
    }

    pub fn with_ttl(ttl_seconds: u64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl_seconds: ttl_seconds.max(1),
        }
    }

    /// Register a built graph under a fresh opaque session id.
    pub fn insert(&self, handle: Arc<GraphHandle>) -> String {
        let session_id = new_session_id();
        let now = SystemTime::now();
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            session_id.clone(),
            SessionEntry {
                handle,
                created_at: now,
                last_used: now,
                query_count: 0,
                total_response_ms: 0,
            },
        );
        session_id
    }

    /// Resolve a session to its graph handle, refreshing its idle timer.
    /// Expired sessions are dropped and reported as not found.
    pub fn get(&self, session_id: &str) -> Result<Arc<GraphHandle>, RagError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(session_id) {
            Some(entry) if !entry.expired(self.ttl_seconds) => {
                entry.last_used = SystemTime::now();
                Ok(entry.handle.clone())
            }
            Some(_) => {
                entries.remove(session_id);
                Err(session_not_found(session_id))
            }
            None => Err(session_not_found(session_id)),
        }
    }

    /// Fold one answered query into the session's running statistics.
    pub fn record_query(&self, session_id: &str, response_ms: u64) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(session_id) {
            entry.query_count += 1;
            entry.total_response_ms += response_ms;
            entry.last_used = SystemTime::now();
        }
    }

    pub fn stats(&self, session_id: &str) -> Result<SessionStats, RagError> {
        let entries = self.entries.lock().unwrap();
        let entry = entries
            .get(session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        let now = SystemTime::now();
        let avg_response_ms = if entry.query_count == 0 {
            0.0
        } else {
            entry.total_response_ms as f64 / entry.query_count as f64
        };
        Ok(SessionStats {
            query_count: entry.query_count,
            avg_response_ms,
            age_seconds: now
                .duration_since(entry.created_at)
                .unwrap_or(Duration::ZERO)
                .as_secs(),
            idle_seconds: now
                .duration_since(entry.last_used)
                .unwrap_or(Duration::ZERO)
                .as_secs(),
        })
    }

    pub fn remove(&self, session_id: &str) -> bool {
        self.entries.lock().unwrap().remove(session_id).is_some()
    }

    /// Drop every expired session; returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| !entry.expired(self.ttl_seconds));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn session_not_found(session_id: &str) -> RagError {
    RagError::new(
        codes::SESSION_NOT_FOUND,
        "Session not found; upload a document first",
    )
    .with_details(format!("session_id={session_id}"))
}

/// Opaque id: hash of a process-wide counter and the current time.
fn new_session_id() -> String {
    let counter = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos();
    let mut hasher = Sha256::new();
    hasher.update(counter.to_be_bytes());
    hasher.update(nanos.to_be_bytes());
    hex::encode(hasher.finalize())
}
