use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::api::{ApiError, RunTransport};

/// Backend conversation context for one user, keyed by app/user/session
/// identifiers. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub user_id: String,
}

/// Owns the one-session-per-client-lifetime cache.
///
/// The session is created lazily on the first query submission and reused
/// for every subsequent query. There is no explicit close protocol; the
/// session ends with the process.
pub struct SessionManager {
    transport: Arc<dyn RunTransport>,
    cached: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn RunTransport>) -> Self {
        Self {
            transport,
            cached: Mutex::new(None),
        }
    }

    /// Returns the cached session, creating one on first use.
    ///
    /// A conflict response means the attempted id is already registered
    /// with the backend; the session is cached and reused rather than
    /// failing the run. Holding the lock across the request collapses
    /// concurrent callers into a single creation attempt.
    pub async fn ensure_session(&self, user_id: &str) -> Result<Session, ApiError> {
        let mut cached = self.cached.lock().await;
        if let Some(session) = cached.as_ref() {
            return Ok(session.clone());
        }

        let session_id = Uuid::new_v4().to_string();
        let session = match self.transport.create_session(user_id, &session_id).await {
            Ok(session) => session,
            Err(err) if err.is_session_conflict() => {
                debug!("session {session_id} already exists; reusing it");
                Session {
                    id: session_id,
                    user_id: user_id.to_string(),
                }
            }
            Err(err) => return Err(err),
        };

        *cached = Some(session.clone());
        Ok(session)
    }

    /// Drops the cached session so the next ensure creates a fresh one.
    pub async fn reset(&self) {
        *self.cached.lock().await = None;
    }
}
