//! JSON-RPC 2.0 message types for the streamable HTTP transport
//!
//! Inbound methods are parsed into a closed [`ClientRequest`] enum so dispatch
//! is exhaustive: adding a method is a compile-time-checked addition, not a
//! new stringly-typed branch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Routing failure: malformed or unroutable protocol request.
pub const BAD_SESSION: i64 = -32000;
/// Gate failure: missing or expired credential session.
///
/// Must stay numerically distinct from [`BAD_SESSION`] so clients can branch
/// on "log in again" vs "bad request".
pub const AUTH_REQUIRED: i64 = -32001;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// A single inbound JSON-RPC message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    /// Absent for notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Only a well-formed initialize request may create a new session.
    pub fn is_initialize(&self) -> bool {
        self.jsonrpc == "2.0" && self.method == "initialize"
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }

    /// Full error response envelope for transport-level rejections that
    /// happen before a request reaches any handler (gate and router errors).
    pub fn envelope(code: i64, message: &str, id: Option<Value>) -> Value {
        serde_json::json!({
            "jsonrpc": "2.0",
            "error": { "code": code, "message": message },
            "id": id,
        })
    }
}

/// A single outbound JSON-RPC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// Server-to-client notification delivered over the session's SSE stream
#[derive(Debug, Clone, Serialize)]
pub struct ServerNotification {
    pub method: String,
    pub params: Value,
}

impl ServerNotification {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// Wire form: a JSON-RPC request without an id.
    pub fn to_message(&self) -> Value {
        serde_json::json!({
            "jsonrpc": "2.0",
            "method": self.method,
            "params": self.params,
        })
    }
}

/// Client implementation info from the initialize handshake
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// Parameters of the initialize request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
    #[serde(default)]
    pub capabilities: Value,
}

/// Parameters of tools/call
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Parameters of resources/read
#[derive(Debug, Clone, Deserialize)]
pub struct ReadResourceParams {
    pub uri: String,
}

/// Every request method a session accepts, as a closed variant set
#[derive(Debug, Clone)]
pub enum ClientRequest {
    Initialize(InitializeParams),
    Ping,
    ToolsList,
    ToolsCall(CallToolParams),
    ResourcesList,
    ResourcesRead(ReadResourceParams),
}

impl ClientRequest {
    pub fn parse(method: &str, params: Option<Value>) -> Result<Self, JsonRpcError> {
        match method {
            "initialize" => {
                let params = match params {
                    Some(value) => serde_json::from_value(value)
                        .map_err(|e| JsonRpcError::invalid_params(e.to_string()))?,
                    None => InitializeParams::default(),
                };
                Ok(ClientRequest::Initialize(params))
            }
            "ping" => Ok(ClientRequest::Ping),
            "tools/list" => Ok(ClientRequest::ToolsList),
            "tools/call" => {
                let value = params
                    .ok_or_else(|| JsonRpcError::invalid_params("tools/call requires params"))?;
                let params = serde_json::from_value(value)
                    .map_err(|e| JsonRpcError::invalid_params(e.to_string()))?;
                Ok(ClientRequest::ToolsCall(params))
            }
            "resources/list" => Ok(ClientRequest::ResourcesList),
            "resources/read" => {
                let value = params
                    .ok_or_else(|| JsonRpcError::invalid_params("resources/read requires params"))?;
                let params = serde_json::from_value(value)
                    .map_err(|e| JsonRpcError::invalid_params(e.to_string()))?;
                Ok(ClientRequest::ResourcesRead(params))
            }
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }
}

/// Notifications a client may send (no response expected)
#[derive(Debug, Clone)]
pub enum ClientNotification {
    Initialized,
    Cancelled,
}

impl ClientNotification {
    /// Unrecognized notifications are ignored per JSON-RPC semantics.
    pub fn parse(method: &str) -> Option<Self> {
        match method {
            "notifications/initialized" => Some(ClientNotification::Initialized),
            "notifications/cancelled" => Some(ClientNotification::Cancelled),
            _ => None,
        }
    }
}
