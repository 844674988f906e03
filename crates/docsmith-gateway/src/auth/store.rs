//! Credential session store
//!
//! In-memory map from an unguessable session id to an authenticated identity.
//! Process restart clears all sessions and forces re-authentication; that is
//! an accepted failure mode, not a bug. Expiry is checked lazily on access
//! rather than by a background sweep.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, info};

/// Authenticated identity resolved during the OAuth callback
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub user_id: String,
    pub email: String,
}

/// One authenticated user session
#[derive(Debug, Clone)]
pub struct CredentialSession {
    pub session_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user_id: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

impl CredentialSession {
    /// A session is expired once `now >= expires_at`.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// In-memory credential session store.
///
/// Read on every gated request, written only by login/logout, so a concurrent
/// map suffices. A lazy eviction racing a logout is safe: removing an absent
/// key is a no-op.
#[derive(Default)]
pub struct CredentialStore {
    sessions: DashMap<String, CredentialSession>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and return its freshly minted id.
    ///
    /// Ids are 32 random bytes, base64url encoded. A collision would indicate
    /// a broken RNG, treated as misconfiguration rather than recovered from.
    pub fn create(
        &self,
        identity: UserIdentity,
        access_token: String,
        refresh_token: Option<String>,
        ttl: Duration,
    ) -> String {
        let session_id = generate_session_id();
        let session = CredentialSession {
            session_id: session_id.clone(),
            access_token,
            refresh_token,
            user_id: identity.user_id,
            email: identity.email,
            expires_at: Utc::now() + ttl,
        };
        info!(
            user_id = %session.user_id,
            expires_at = %session.expires_at,
            "created credential session"
        );
        self.sessions.insert(session_id.clone(), session);
        session_id
    }

    /// Pure lookup without expiry handling.
    pub fn get(&self, session_id: &str) -> Option<CredentialSession> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    /// Lookup with lazy eviction: an expired entry is deleted at detection
    /// time and reported absent. Idempotent; a second access behaves as if
    /// the session never existed.
    pub fn evict_if_expired(&self, session_id: &str) -> Option<CredentialSession> {
        let session = self.get(session_id)?;
        if session.is_expired() {
            debug!(session_id, "evicting expired credential session");
            self.sessions.remove(session_id);
            return None;
        }
        Some(session)
    }

    /// Unconditional removal; absent keys are a no-op (logout idempotence).
    pub fn delete(&self, session_id: &str) -> Option<CredentialSession> {
        let removed = self.sessions.remove(session_id).map(|(_, s)| s);
        if removed.is_some() {
            info!(session_id, "deleted credential session");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Generate an unguessable session id (32 random bytes, base64url).
fn generate_session_id() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    URL_SAFE_NO_PAD.encode(bytes)
}
