//! MCP server over stdio: JSON-RPC 2.0 envelopes, method dispatch, line transport.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{CallToolResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolDefinition};
pub use server::{McpServer, SERVER_NAME};
pub use transport::{serve, serve_stdio};
