//! Shared test utilities and fixtures for Docsmith integration tests.

pub mod mocks;
pub use mocks::MockGenerator;

use std::sync::Arc;

use docsmith_core::DocumentGenerator;
use docsmith_gateway::server::{AppState, MCP_SESSION_HEADER};
use docsmith_gateway::{auth::SESSION_HEADER, GatewayConfig, GatewayServer, OAuthConfig, UserIdentity};
use serde_json::{json, Value};

/// A gateway bound to an ephemeral port, exercised over real HTTP.
///
/// Holds the shared [`AppState`] so tests can seed the credential store or
/// inspect the session registry directly.
pub struct TestGateway {
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

/// OAuth config whose endpoints resolve nowhere. Tests that exercise the
/// provider side swap in a wiremock server via [`spawn_gateway_with_oauth`].
pub fn offline_oauth_config() -> OAuthConfig {
    OAuthConfig {
        client_id: "client_123".to_string(),
        client_secret: "secret".to_string(),
        authorization_url: "https://auth.invalid/authorize".to_string(),
        token_url: "https://auth.invalid/token".to_string(),
        revocation_url: None,
        userinfo_url: None,
        redirect_uri: "http://localhost:3001/auth/callback".to_string(),
        scopes: vec!["read:user".to_string()],
    }
}

pub async fn spawn_gateway(generator: Arc<dyn DocumentGenerator>) -> TestGateway {
    spawn_gateway_with_oauth(offline_oauth_config(), generator).await
}

/// Serve a gateway on 127.0.0.1:0 in a background task.
pub async fn spawn_gateway_with_oauth(
    oauth: OAuthConfig,
    generator: Arc<dyn DocumentGenerator>,
) -> TestGateway {
    let server = GatewayServer::new(GatewayConfig::default(), oauth, generator);
    let state = server.state();
    let router = server.build_router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve gateway");
    });

    TestGateway {
        base_url: format!("http://{}", addr),
        state,
        // Redirects stay visible so tests can assert on Location headers
        client: reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("build http client"),
    }
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Mint a credential session directly in the store, bypassing OAuth.
    pub fn login(&self) -> String {
        self.login_with_ttl(chrono::Duration::hours(1))
    }

    pub fn login_expired(&self) -> String {
        self.login_with_ttl(chrono::Duration::seconds(-1))
    }

    pub fn login_with_ttl(&self, ttl: chrono::Duration) -> String {
        self.state.store.create(
            UserIdentity {
                user_id: "user_1".to_string(),
                email: "user@example.com".to_string(),
            },
            "access-token".to_string(),
            None,
            ttl,
        )
    }

    /// POST a protocol message, optionally carrying a transport session id.
    pub async fn mcp_post(
        &self,
        auth: &str,
        mcp_session: Option<&str>,
        body: &Value,
    ) -> reqwest::Response {
        let mut request = self
            .client
            .post(self.url("/mcp"))
            .header(SESSION_HEADER, auth)
            .json(body);
        if let Some(id) = mcp_session {
            request = request.header(MCP_SESSION_HEADER, id);
        }
        request.send().await.expect("mcp post")
    }

    /// Run the initialize handshake and return the minted transport session id.
    pub async fn initialize(&self, auth: &str) -> String {
        let response = self.mcp_post(auth, None, &initialize_request(1)).await;
        assert_eq!(response.status(), 200, "initialize should succeed");
        response
            .headers()
            .get(MCP_SESSION_HEADER)
            .expect("transport session header")
            .to_str()
            .expect("header is ascii")
            .to_string()
    }

    pub async fn mcp_delete(&self, auth: &str, mcp_session: &str) -> reqwest::Response {
        self.client
            .delete(self.url("/mcp"))
            .header(SESSION_HEADER, auth)
            .header(MCP_SESSION_HEADER, mcp_session)
            .send()
            .await
            .expect("mcp delete")
    }
}

pub fn initialize_request(id: u64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "clientInfo": { "name": "test-client", "version": "0.1.0" },
            "capabilities": {}
        }
    })
}

pub fn rpc_request(id: u64, method: &str, params: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params })
}

pub fn notification(method: &str) -> Value {
    json!({ "jsonrpc": "2.0", "method": method })
}
