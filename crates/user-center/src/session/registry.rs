//! Server-side session registry keyed by session id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::Session;

#[derive(Debug)]
struct Entry {
    session: Session,
    last_seen: Instant,
}

impl Entry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_seen.elapsed() >= ttl
    }
}

/// Sessions with an idle TTL. A session that is not touched for `ttl` is
/// treated as absent and removed by the next sweep.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// A fresh, unguessable session id.
    pub fn issue_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    /// Load a live session and refresh its idle timer.
    pub async fn load(&self, session_id: &str) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let expired = match sessions.get_mut(session_id) {
            Some(entry) if !entry.is_expired(self.ttl) => {
                entry.last_seen = Instant::now();
                return Some(entry.session.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            sessions.remove(session_id);
            tracing::debug!(session = %short_id(session_id), "Session expired");
        }
        None
    }

    pub async fn store(&self, session_id: &str, session: Session) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            session_id.to_string(),
            Entry {
                session,
                last_seen: Instant::now(),
            },
        );
    }

    pub async fn invalidate(&self, session_id: &str) {
        if self.sessions.write().await.remove(session_id).is_some() {
            tracing::debug!(session = %short_id(session_id), "Session invalidated");
        }
    }

    /// Drop every expired session, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(self.ttl));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Run `purge_expired` every `interval` until the task is aborted.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let purged = registry.purge_expired().await;
                if purged > 0 {
                    tracing::debug!(purged, "Expired sessions swept");
                }
            }
        })
    }
}

/// Log-safe prefix of a session id.
fn short_id(session_id: &str) -> &str {
    &session_id[..8.min(session_id.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionStore, USER_LOGIN_STATE};
    use serde_json::json;

    fn logged_in() -> Session {
        let mut session = Session::new();
        session.set(USER_LOGIN_STATE, json!({"id": 1}));
        session
    }

    #[tokio::test]
    async fn test_store_and_load() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let id = registry.issue_id();
        assert_eq!(id.len(), 32);
        assert!(registry.load(&id).await.is_none());

        registry.store(&id, logged_in()).await;
        assert_eq!(registry.load(&id).await, Some(logged_in()));

        registry.invalidate(&id).await;
        assert!(registry.load(&id).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_expired_sessions_are_dropped() {
        let registry = SessionRegistry::new(Duration::ZERO);
        registry.store("a", logged_in()).await;
        registry.store("b", logged_in()).await;
        assert_eq!(registry.len().await, 2);

        assert!(registry.load("a").await.is_none());
        assert_eq!(registry.purge_expired().await, 1);
        assert!(registry.is_empty().await);
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }
}
