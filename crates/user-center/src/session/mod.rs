//! Per-connection session state.
//!
//! A [`Session`] is a small attribute map. The account service reads and
//! writes it through [`SessionStore`]; the HTTP layer keeps sessions in a
//! [`SessionRegistry`] keyed by the session cookie and hands each request a
//! [`SessionHandle`].

mod registry;

pub use registry::SessionRegistry;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Attribute key under which the logged-in user is kept.
pub const USER_LOGIN_STATE: &str = "user_login_state";

/// Keyed attribute storage for one session.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<&Value>;
    fn set(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str) -> Option<Value>;
}

/// In-process session contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    attributes: HashMap<String, Value>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl SessionStore for Session {
    fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.attributes.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        self.attributes.remove(key)
    }
}

/// A request's view of its session, shared between middleware and handler.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle(Arc<Mutex<Session>>);

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.0.lock().await
    }

    /// Copy of the current contents.
    pub async fn snapshot(&self) -> Session {
        self.0.lock().await.clone()
    }
}
