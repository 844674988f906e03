//! MCP protocol layer
//!
//! JSON-RPC message types, the transport session registry and router, the
//! per-session protocol handler, and the tool surface.

pub mod handler;
pub mod jsonrpc;
pub mod router;
pub mod tools;

pub use handler::{SessionHandler, PROTOCOL_VERSION};
pub use jsonrpc::{
    ClientNotification, ClientRequest, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ServerNotification,
};
pub use router::{decide, RouteDecision, SessionRegistry, SessionState, TransportSession};
pub use tools::{CallToolResult, ToolRequest, ToolSpec};
