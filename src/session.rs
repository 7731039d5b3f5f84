//! Per-user session cache
//!
//! Powerdrill keeps conversational context server-side, keyed by a session id.
//! `SessionCache` maps each user id to the session created for it the first
//! time that user asks something, and reuses it for the lifetime of the cache.
//!
//! Creation is coordinated per user: concurrent first-time lookups for the same
//! user share a single upstream call, while other users proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use crate::api::{CreateSessionRequest, PowerdrillApi};
use crate::error::Result;

/// User id → upstream session id, never evicted
///
/// The key is the user id alone. Sessions created against one deployment
/// (`base_url` and `api_key`) are reused if the same user id later arrives
/// with another, so each deployment needs its own cache.
#[derive(Debug, Default)]
pub struct SessionCache {
    sessions: Mutex<HashMap<String, Arc<OnceCell<String>>>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session for `user_id`, creating it upstream on first use.
    ///
    /// A failed creation leaves nothing cached, so the next call retries.
    pub async fn resolve(&self, api: &dyn PowerdrillApi, user_id: &str) -> Result<String> {
        let cell = {
            let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(sessions.entry(user_id.to_string()).or_default())
        };

        if let Some(id) = cell.get() {
            tracing::debug!(user_id, session_id = %id, "reusing cached session");
            return Ok(id.clone());
        }

        let id = cell
            .get_or_try_init(|| async move {
                let request = CreateSessionRequest::for_user(user_id);
                let id = api.create_session(&request).await?;
                tracing::info!(user_id, session_id = %id, "created session");
                Ok::<_, crate::error::PowerdrillError>(id)
            })
            .await?;

        Ok(id.clone())
    }

    /// Cached session for `user_id`, if one has been created
    pub fn get(&self, user_id: &str) -> Option<String> {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.get(user_id).and_then(|cell| cell.get().cloned())
    }

    /// Number of users with a live session
    pub fn len(&self) -> usize {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every session; the next question per user opens a new one
    pub fn clear(&self) {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}
