//! Per-session protocol handler
//!
//! One handler instance exists per transport session and is owned by it
//! exclusively. It answers the initialize handshake, serves the tool surface,
//! and exposes the read-only status resource.

use serde_json::{json, Value};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::{debug, info};

use docsmith_core::{branding, DocumentGenerator};

use super::jsonrpc::{
    ClientNotification, ClientRequest, InitializeParams, JsonRpcError, ServerNotification,
};
use super::router::SessionRegistry;
use super::tools;

/// Highest MCP protocol revision this server speaks
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Stateful handler for one session
pub struct SessionHandler {
    generator: Arc<dyn DocumentGenerator>,
    /// Weak: the registry owns the sessions which own the handlers
    registry: Weak<SessionRegistry>,
    notify_tx: broadcast::Sender<ServerNotification>,
}

impl SessionHandler {
    pub fn new(
        generator: Arc<dyn DocumentGenerator>,
        registry: Weak<SessionRegistry>,
        notify_tx: broadcast::Sender<ServerNotification>,
    ) -> Self {
        Self {
            generator,
            registry,
            notify_tx,
        }
    }

    /// Exhaustive dispatch over the closed request set.
    pub async fn dispatch(&self, request: ClientRequest) -> Result<Value, JsonRpcError> {
        match request {
            ClientRequest::Initialize(params) => Ok(self.initialize(params)),
            ClientRequest::Ping => Ok(json!({})),
            ClientRequest::ToolsList => Ok(self.list_tools()),
            ClientRequest::ToolsCall(params) => self.call_tool(params.name, params.arguments).await,
            ClientRequest::ResourcesList => Ok(self.list_resources()),
            ClientRequest::ResourcesRead(params) => self.read_resource(&params.uri),
        }
    }

    pub fn on_notification(&self, session_id: &str, notification: ClientNotification) {
        match notification {
            ClientNotification::Initialized => {
                info!(session_id, "client reported initialized");
            }
            ClientNotification::Cancelled => {
                debug!(session_id, "client cancelled an in-flight request");
            }
        }
    }

    fn initialize(&self, params: InitializeParams) -> Value {
        let client = params.client_info.unwrap_or_default();
        let negotiated = negotiate_protocol_version(params.protocol_version.as_deref());
        debug!(
            client_name = %client.name,
            client_version = %client.version,
            protocol_version = negotiated,
            "client initializing"
        );

        json!({
            "protocolVersion": negotiated,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "subscribe": false, "listChanged": false }
            },
            "serverInfo": {
                "name": branding::SERVER_NAME,
                "version": branding::VERSION
            },
            "instructions": "Docsmith generates project documentation. Call \
                             generate-documentation with template ids and variables, \
                             or the create-agents-md / create-cursor-rules shortcuts."
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<Value> = tools::tool_specs().iter().map(|s| s.to_value()).collect();
        json!({ "tools": tools })
    }

    async fn call_tool(&self, name: String, arguments: Value) -> Result<Value, JsonRpcError> {
        // Schema validation happens here; invalid calls never reach the generator
        let request = tools::ToolRequest::parse(&name, arguments)?;

        info!(tool = request.tool_name(), "call_tool");
        let result = tools::execute(request, &self.generator).await;

        // Best-effort side channel; nobody listening is fine
        let _ = self.notify_tx.send(ServerNotification::new(
            "notifications/message",
            json!({
                "level": if result.is_error { "error" } else { "info" },
                "data": format!("tool {} completed (isError: {})", name, result.is_error),
            }),
        ));

        Ok(result.to_value())
    }

    fn list_resources(&self) -> Value {
        json!({
            "resources": [{
                "uri": branding::STATUS_RESOURCE_URI,
                "name": "Server Status",
                "description": "Current status of the Docsmith gateway",
                "mimeType": "application/json"
            }]
        })
    }

    /// The status resource is a pure side-channel query; it never mutates state.
    fn read_resource(&self, uri: &str) -> Result<Value, JsonRpcError> {
        if uri != branding::STATUS_RESOURCE_URI {
            return Err(JsonRpcError::invalid_params(format!(
                "Unknown resource: {}",
                uri
            )));
        }

        let active_sessions = self.registry.upgrade().map(|r| r.len()).unwrap_or(0);
        let status = json!({
            "server": branding::SERVER_NAME,
            "version": branding::VERSION,
            "status": "running",
            "activeSessions": active_sessions,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        Ok(json!({
            "contents": [{
                "uri": uri,
                "mimeType": "application/json",
                "text": status.to_string(),
            }]
        }))
    }
}

/// Respond with the client's version when we support it, otherwise ours.
fn negotiate_protocol_version(client_version: Option<&str>) -> &str {
    match client_version {
        // Revision strings are dates; lexicographic order is chronological
        Some(v) if is_protocol_revision(v) && v <= PROTOCOL_VERSION => v,
        _ => PROTOCOL_VERSION,
    }
}

/// Protocol revisions are strict `YYYY-MM-DD` date strings; anything else
/// must not win the negotiation.
fn is_protocol_revision(v: &str) -> bool {
    v.len() == 10 && chrono::NaiveDate::parse_from_str(v, "%Y-%m-%d").is_ok()
}
