//! Centralized branding constants
//!
//! All product naming comes from this module so the gateway, health endpoint,
//! and MCP server info stay consistent.

/// Server name reported over MCP and in health responses
pub const SERVER_NAME: &str = "docsmith-gateway";

/// Product display name
pub const DISPLAY_NAME: &str = "Docsmith";

/// Crate version, reported as the MCP server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default gateway listen port
pub const DEFAULT_GATEWAY_PORT: u16 = 3001;

/// Default front-end origin (CORS + post-login redirect)
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

/// URI of the discoverable server status resource
pub const STATUS_RESOURCE_URI: &str = "docsmith://status";

/// Get the base URL for a locally bound gateway
pub fn local_base_url(port: u16) -> String {
    format!("http://localhost:{}", port)
}
