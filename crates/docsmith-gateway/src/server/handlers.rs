//! HTTP handlers for the gateway server

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Redirect, Response,
    },
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use docsmith_core::branding;

use super::state::AppState;
use crate::auth::{AuthContext, SESSION_HEADER};
use crate::mcp::jsonrpc::{self, JsonRpcError, JsonRpcRequest};
use crate::mcp::{decide, ClientNotification, RouteDecision, SessionRegistry, TransportSession};

/// Header carrying the transport session id (distinct from the auth header)
pub const MCP_SESSION_HEADER: &str = "mcp-session-id";

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Unauthenticated liveness probe
pub async fn health(State(app): State<AppState>) -> Json<Value> {
    debug!("health check");
    Json(json!({
        "status": "healthy",
        "server": branding::SERVER_NAME,
        "version": branding::VERSION,
        "activeSessions": app.registry.len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

// ---------------------------------------------------------------------------
// MCP transport
// ---------------------------------------------------------------------------

fn transport_session(app: &AppState, headers: &HeaderMap) -> (bool, Option<Arc<TransportSession>>) {
    let header = headers
        .get(MCP_SESSION_HEADER)
        .and_then(|v| v.to_str().ok());
    let session = header.and_then(|id| app.registry.get(id));
    (header.is_some(), session)
}

fn bad_session_response(id: Option<Value>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(JsonRpcError::envelope(
            jsonrpc::BAD_SESSION,
            "Bad Request: No valid session ID provided",
            id,
        )),
    )
        .into_response()
}

fn with_session_header(mut response: Response, session_id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(session_id) {
        response.headers_mut().insert(MCP_SESSION_HEADER, value);
    }
    response
}

/// Primary client-to-server channel.
///
/// Routing is the pure [`decide`] function over (has-header, known-session,
/// is-initialize); only a session-less initialize may create state.
pub async fn mcp_post(
    State(app): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "unparseable protocol message");
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcError::envelope(
                    jsonrpc::PARSE_ERROR,
                    "Parse error",
                    None,
                )),
            )
                .into_response();
        }
    };

    let (has_header, existing) = transport_session(&app, &headers);

    match decide(has_header, existing.is_some(), request.is_initialize()) {
        RouteDecision::Reuse => {
            // existing is Some by construction of the decision
            let Some(session) = existing else {
                return bad_session_response(request.id);
            };

            if request.is_notification() {
                if let Some(notification) = ClientNotification::parse(&request.method) {
                    session.handle_notification(notification);
                }
                return StatusCode::ACCEPTED.into_response();
            }

            let session_id = session.id().to_string();
            let response = session.handle(request).await;
            with_session_header(Json(response).into_response(), &session_id)
        }
        RouteDecision::Create => {
            let session = app.registry.open_session(app.generator.clone());
            let session_id = session.id().to_string();
            let response = session.handle(request).await;

            if response.error.is_some() {
                // Failed handshake leaves no session behind
                app.registry.remove(&session_id);
                return with_session_header(Json(response).into_response(), &session_id);
            }

            info!(session_id = %session_id, user_id = %auth.user_id, "initialized new transport session");
            with_session_header(Json(response).into_response(), &session_id)
        }
        RouteDecision::Reject => bad_session_response(request.id),
    }
}

/// Tears the session down when its notification stream ends. A closed
/// stream (client disconnect included) is the channel-closure signal; the
/// session id is retired with it.
struct StreamTeardown {
    registry: Arc<SessionRegistry>,
    session_id: String,
}

impl Drop for StreamTeardown {
    fn drop(&mut self) {
        if self.registry.remove(&self.session_id).is_some() {
            debug!(session_id = %self.session_id, "notification stream closed, session removed");
        }
    }
}

/// Server-to-client notification stream (SSE) for an established session.
///
/// The stream is the session's server-to-client half: when it ends, the
/// session is removed from the registry.
pub async fn mcp_get(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let (_, session) = transport_session(&app, &headers);
    let Some(session) = session else {
        return bad_session_response(None);
    };

    let session_id = session.id().to_string();
    let mut rx = session.subscribe();
    drop(session);
    debug!(session_id = %session_id, "notification stream opened");

    let teardown = StreamTeardown {
        registry: app.registry.clone(),
        session_id,
    };

    let stream = async_stream::stream! {
        // Held for the stream's lifetime; dropping it removes the session
        let _teardown = teardown;
        loop {
            match rx.recv().await {
                Ok(notification) => {
                    yield Ok::<_, std::convert::Infallible>(
                        Event::default()
                            .event("message")
                            .data(notification.to_message().to_string()),
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(30)))
        .into_response()
}

/// Explicit session termination. The id is never reused afterwards.
pub async fn mcp_delete(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let header = headers
        .get(MCP_SESSION_HEADER)
        .and_then(|v| v.to_str().ok());

    let Some(session_id) = header else {
        return bad_session_response(None);
    };

    match app.registry.remove(session_id) {
        Some(_) => StatusCode::OK.into_response(),
        None => bad_session_response(None),
    }
}

// ---------------------------------------------------------------------------
// Auth endpoints
// ---------------------------------------------------------------------------

/// Redirect the browser to the external authorization endpoint.
pub async fn auth_login(State(app): State<AppState>) -> Response {
    match app.oauth.begin_login() {
        Ok(url) => Redirect::temporary(&url).into_response(),
        Err(e) => {
            error!(error = %e, "cannot build authorization URL");
            (StatusCode::INTERNAL_SERVER_ERROR, "Authentication unavailable").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// OAuth callback: verify state, exchange the code, mint a credential
/// session, and send the browser back to the front-end with the session id.
pub async fn auth_callback(
    State(app): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(code) = params.code else {
        return (StatusCode::BAD_REQUEST, "Missing authorization code").into_response();
    };

    let state_valid = params
        .state
        .as_deref()
        .map(|s| app.oauth.take_state(s))
        .unwrap_or(false);
    if !state_valid {
        warn!("callback with missing or unrecognized state parameter");
        return (StatusCode::BAD_REQUEST, "Invalid state parameter").into_response();
    }

    let token = match app.oauth.exchange_code(&code).await {
        Ok(token) => token,
        Err(e) => {
            // No partial session on any exchange failure
            error!(error = %e, "OAuth code exchange failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed").into_response();
        }
    };

    let identity = app.oauth.resolve_identity(&token.access_token).await;
    let ttl = token.ttl();
    let session_id = app
        .store
        .create(identity, token.access_token, token.refresh_token, ttl);

    Redirect::temporary(&format!("{}/?session={}", app.frontend_url, session_id)).into_response()
}

/// Logout: best-effort remote revoke, unconditional local deletion.
/// Always succeeds, and is idempotent.
pub async fn auth_logout(State(app): State<AppState>, headers: HeaderMap) -> Json<Value> {
    let session_id = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok());

    if let Some(session_id) = session_id {
        if let Some(session) = app.store.delete(session_id) {
            // Deliberately discarded error channel: revocation is best-effort
            // and must never block or fail the local logout.
            let oauth = app.oauth.clone();
            tokio::spawn(async move {
                if let Err(e) = oauth.revoke_token(&session.access_token).await {
                    warn!(error = %e, "token revocation failed (ignored)");
                }
            });
        }
    }

    Json(json!({ "success": true }))
}

/// Session introspection for the front-end.
pub async fn auth_session(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let session_id = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok());

    let session = session_id.and_then(|id| app.store.evict_if_expired(id));
    match session {
        Some(session) => Json(json!({
            "authenticated": true,
            "user": { "id": session.user_id, "email": session.email },
            "expiresAt": session.expires_at.to_rfc3339(),
        }))
        .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "authenticated": false })),
        )
            .into_response(),
    }
}
