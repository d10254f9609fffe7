use dashmap::DashMap;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Data stored per login session. Mirrors the token's claims so handlers
/// never re-parse the JWT.
#[derive(Debug, Clone, Serialize)]
pub struct SessionData {
    pub client_id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    /// Unix timestamp after which the session is dead.
    pub expires_at: u64,
}

/// Thread-safe in-memory session store keyed by the issued token.
/// Deliberately non-durable: a restart logs everyone out. A shared KV
/// store would replace this for multi-instance deployments.
pub struct SessionStore {
    sessions: DashMap<String, SessionData>,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Insert a session under its token.
    pub fn insert(&self, token: String, data: SessionData) {
        self.sessions.insert(token, data);
    }

    /// Get a live session by token. Expired entries are evicted on the way
    /// out and reported as absent.
    pub fn get(&self, token: &str) -> Option<SessionData> {
        let expired = match self.sessions.get(token) {
            Some(entry) => {
                if entry.expires_at > now_secs() {
                    return Some(entry.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.sessions.remove(token);
        }
        None
    }

    /// Remove a session by token. Returns the removed data if it existed.
    pub fn remove(&self, token: &str) -> Option<SessionData> {
        self.sessions.remove(token).map(|(_, data)| data)
    }

    /// Drop every expired session. Called by the periodic sweep.
    pub fn cleanup_expired(&self) {
        let now = now_secs();
        self.sessions.retain(|_, data| data.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
