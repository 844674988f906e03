//! Transport session registry and request router
//!
//! The registry is the single source of truth for "is this session alive".
//! Every mutation (create, remove) goes through one writer lock so two
//! concurrent initialize requests can never race into the same slot, and a
//! session id is never reused after teardown (ids are minted v4 UUIDs).
//!
//! The routing decision itself is a pure function of
//! (has-session-header?, registry-contains?, is-initialize?) so it can be
//! tested without any I/O.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex as SyncMutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

use docsmith_core::DocumentGenerator;

use super::handler::SessionHandler;
use super::jsonrpc::{
    ClientNotification, ClientRequest, JsonRpcRequest, JsonRpcResponse, ServerNotification,
};

/// Outcome of routing one inbound protocol message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Deliver to the existing session (hot path for post-handshake traffic)
    Reuse,
    /// Mint a new session; only a session-less initialize request may do this
    Create,
    /// Reject without creating or mutating any state
    Reject,
}

/// Pure routing decision, evaluated in order:
/// recognized session id wins, then session-less initialize, then reject.
pub fn decide(has_session_header: bool, is_known_session: bool, is_initialize: bool) -> RouteDecision {
    if has_session_header && is_known_session {
        RouteDecision::Reuse
    } else if !has_session_header && is_initialize {
        RouteDecision::Create
    } else {
        RouteDecision::Reject
    }
}

/// Lifecycle of a transport session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Active,
    Closed,
}

/// Capacity of the per-session outbound notification channel
const NOTIFY_CHANNEL_CAPACITY: usize = 64;

/// Live channel state for one connected client.
///
/// Sole owner of its protocol handler; all requests for this session id are
/// dispatched through it, serialized in receipt order.
pub struct TransportSession {
    id: String,
    handler: SessionHandler,
    state: SyncMutex<SessionState>,
    /// Serializes dispatch so the stateful handler sees requests in order
    serial: Mutex<()>,
    notify_tx: broadcast::Sender<ServerNotification>,
    started_at: DateTime<Utc>,
}

impl TransportSession {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Subscribe to server-to-client notifications for this session.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerNotification> {
        self.notify_tx.subscribe()
    }

    /// Dispatch one request through this session's handler.
    ///
    /// Requests are handled in receipt order; the serial lock is held across
    /// the whole dispatch, including collaborator awaits, on purpose.
    pub async fn handle(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let _order = self.serial.lock().await;

        let id = request.id.clone().unwrap_or(serde_json::Value::Null);
        let parsed = match ClientRequest::parse(&request.method, request.params) {
            Ok(parsed) => parsed,
            Err(error) => return JsonRpcResponse::failure(id, error),
        };

        let completes_handshake = matches!(parsed, ClientRequest::Initialize(_));
        let response = match self.handler.dispatch(parsed).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        };

        if completes_handshake && response.error.is_none() {
            let mut state = self.state.lock();
            if *state == SessionState::Initializing {
                *state = SessionState::Active;
                debug!(session_id = %self.id, "session active");
            }
        }

        response
    }

    /// Deliver a client notification (no response).
    pub fn handle_notification(&self, notification: ClientNotification) {
        self.handler.on_notification(&self.id, notification);
    }

    fn close(&self) {
        *self.state.lock() = SessionState::Closed;
        // Dropping all receivers ends any open SSE stream lazily; senders
        // into a closed session simply find no subscribers.
    }
}

/// Registry of live transport sessions, keyed by server-minted session id.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<TransportSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Create and register a new session with its own handler instance.
    ///
    /// Id minting and insertion happen under a single write-lock acquisition.
    pub fn open_session(
        self: &Arc<Self>,
        generator: Arc<dyn DocumentGenerator>,
    ) -> Arc<TransportSession> {
        let (notify_tx, _) = broadcast::channel(NOTIFY_CHANNEL_CAPACITY);
        let handler = SessionHandler::new(generator, Arc::downgrade(self), notify_tx.clone());

        let session = Arc::new(TransportSession {
            id: Uuid::new_v4().to_string(),
            handler,
            state: SyncMutex::new(SessionState::Initializing),
            serial: Mutex::new(()),
            notify_tx,
            started_at: Utc::now(),
        });

        let mut sessions = self.sessions.write();
        sessions.insert(session.id.clone(), session.clone());
        info!(session_id = %session.id, total = sessions.len(), "opened transport session");
        session
    }

    /// Look up a live session. The read path for established sessions.
    pub fn get(&self, session_id: &str) -> Option<Arc<TransportSession>> {
        self.sessions.read().get(session_id).cloned()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().contains_key(session_id)
    }

    /// Tear down a session: remove from the registry and mark closed.
    /// The id is never reused afterwards.
    pub fn remove(&self, session_id: &str) -> Option<Arc<TransportSession>> {
        let removed = self.sessions.write().remove(session_id);
        if let Some(session) = &removed {
            session.close();
            info!(session_id, "closed transport session");
        }
        removed
    }

    /// Number of live sessions (health endpoint and status resource).
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
