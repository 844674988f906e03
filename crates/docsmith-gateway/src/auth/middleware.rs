//! Authentication gate for protocol endpoints
//!
//! Extracts the `x-session-id` header, validates it against the credential
//! store (with lazy expiry eviction), and injects the resolved identity into
//! request extensions. Runs before any transport-session handling: a request
//! that fails here never touches the session registry.

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    middleware::Next,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::store::CredentialStore;
use crate::mcp::jsonrpc::{self, JsonRpcError};

/// Header carrying the credential session id
pub const SESSION_HEADER: &str = "x-session-id";

/// Resolved identity attached to authenticated requests
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub session_id: String,
    pub user_id: String,
    pub email: String,
}

/// Gate middleware for `/mcp` routes.
///
/// Missing and expired sessions share the same error code (`-32001`, distinct
/// from routing's `-32000`) but carry distinguishable messages so clients can
/// tell "log in" from "log in again".
pub async fn require_session(
    axum::extract::State(store): axum::extract::State<Arc<CredentialStore>>,
    mut request: Request<Body>,
    next: Next,
) -> Response<Body> {
    // CORS preflight carries no credentials
    if request.method() == axum::http::Method::OPTIONS {
        return next.run(request).await;
    }

    let session_id = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let Some(session_id) = session_id else {
        warn!("request without credential session header");
        return auth_error("Authentication required");
    };

    let Some(session) = store.evict_if_expired(&session_id) else {
        warn!("request with absent or expired credential session");
        return auth_error("Session expired");
    };

    debug!(user_id = %session.user_id, "request authenticated");
    request.extensions_mut().insert(AuthContext {
        session_id,
        user_id: session.user_id,
        email: session.email,
    });

    next.run(request).await
}

fn auth_error(message: &str) -> Response<Body> {
    (
        StatusCode::UNAUTHORIZED,
        Json(JsonRpcError::envelope(
            jsonrpc::AUTH_REQUIRED,
            message,
            None,
        )),
    )
        .into_response()
}
