//! Gateway server
//!
//! HTTP server exposing the MCP protocol over streamable HTTP plus the OAuth
//! login endpoints. All state is injected: the credential store, session
//! registry, OAuth flow, and generation collaborator are constructed here and
//! passed down, never reached for as globals.

mod handlers;
mod state;

pub use handlers::MCP_SESSION_HEADER;
pub use state::AppState;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use docsmith_core::{branding, DocumentGenerator};

use crate::auth::{require_session, CredentialStore};
use crate::mcp::SessionRegistry;
use crate::oauth::{OAuthConfig, OAuthFlow};

/// Gateway server configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origin for browser clients
    pub cors_origin: String,
    /// Front-end base URL for the post-login redirect
    pub frontend_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: branding::DEFAULT_GATEWAY_PORT,
            cors_origin: branding::DEFAULT_FRONTEND_URL.to_string(),
            frontend_url: branding::DEFAULT_FRONTEND_URL.to_string(),
        }
    }
}

impl GatewayConfig {
    /// Read configuration from the environment, defaulting for local dev.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("MCP_HOST").unwrap_or(defaults.host),
            port: std::env::var("MCP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            cors_origin: std::env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            frontend_url: std::env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], branding::DEFAULT_GATEWAY_PORT)))
    }

    pub fn base_url(&self) -> String {
        branding::local_base_url(self.port)
    }
}

/// The Docsmith gateway server
pub struct GatewayServer {
    config: GatewayConfig,
    state: AppState,
}

impl GatewayServer {
    /// Assemble the server with injected dependencies.
    pub fn new(
        config: GatewayConfig,
        oauth_config: OAuthConfig,
        generator: Arc<dyn DocumentGenerator>,
    ) -> Self {
        let state = AppState {
            store: Arc::new(CredentialStore::new()),
            registry: SessionRegistry::new(),
            oauth: Arc::new(OAuthFlow::new(oauth_config)),
            generator,
            frontend_url: config.frontend_url.clone(),
        };
        Self { config, state }
    }

    /// Shared state handle, mainly for tests that poke the stores directly.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the axum router: public health + auth endpoints, gated /mcp.
    pub fn build_router(&self) -> Router {
        let gated_mcp = Router::new()
            .route(
                "/mcp",
                post(handlers::mcp_post)
                    .get(handlers::mcp_get)
                    .delete(handlers::mcp_delete),
            )
            .layer(middleware::from_fn_with_state(
                self.state.store.clone(),
                require_session,
            ));

        let cors = match self.config.cors_origin.parse::<HeaderValue>() {
            Ok(origin) => CorsLayer::new().allow_origin(origin),
            Err(_) => {
                warn!(origin = %self.config.cors_origin, "invalid CORS origin, allowing any");
                CorsLayer::new().allow_origin(Any)
            }
        }
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([http::header::HeaderName::from_static(
            handlers::MCP_SESSION_HEADER,
        )]);

        Router::new()
            .route("/health", get(handlers::health))
            .route("/auth/login", get(handlers::auth_login))
            .route("/auth/callback", get(handlers::auth_callback))
            .route("/auth/logout", post(handlers::auth_logout))
            .route("/auth/session", get(handlers::auth_session))
            .merge(gated_mcp)
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Run until ctrl-c. Sessions are volatile: shutdown discards them all.
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.addr();
        let router = self.build_router();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("gateway listening on {}", addr);
        info!("MCP endpoint: {}/mcp", self.config.base_url());
        info!("health check: {}/health", self.config.base_url());

        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutdown signal received");
            })
            .await?;

        Ok(())
    }

    /// Start the server in the background.
    pub fn spawn(self) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
