//! Docsmith Gateway
//!
//! MCP server for AI documentation generation:
//! - OAuth login flow backed by an in-memory credential session store
//! - Authentication gate in front of every protocol endpoint
//! - Streamable HTTP transport multiplexing many concurrent MCP sessions
//! - Schema-validated tool surface over a pluggable generation collaborator

pub mod auth;
pub mod mcp;
pub mod oauth;
pub mod server;

pub use auth::{AuthContext, CredentialSession, CredentialStore, UserIdentity};
pub use mcp::{
    decide, ClientRequest, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RouteDecision,
    SessionRegistry, SessionState, TransportSession,
};
pub use oauth::{OAuthConfig, OAuthExchangeError, OAuthFlow, TokenResponse};
pub use server::{GatewayConfig, GatewayServer};
