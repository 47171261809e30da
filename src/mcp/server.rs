//! Method dispatch: initialize, ping, tools/list, tools/call.

use serde_json::{Value, json};

use crate::mcp::protocol::{
    CallToolParams, CallToolResult, Implementation, InitializeParams, InitializeResult,
    JSONRPC_VERSION, JsonRpcError, JsonRpcRequest, JsonRpcResponse, SUPPORTED_PROTOCOL_VERSIONS,
    ServerCapabilities, ToolsCapability,
};
use crate::tools::{ToolCtx, ToolRegistry};

pub const SERVER_NAME: &str = "wecom-bot-server";

const INSTRUCTIONS: &str = "Send messages and files to WeCom group chats. \
Every tool takes the group robot's webhook_key; nothing is configured server-side.";

/// Stateless apart from the registry; share behind an `Arc` across request tasks.
pub struct McpServer {
    registry: ToolRegistry,
    ctx: ToolCtx,
}

impl McpServer {
    pub fn new(registry: ToolRegistry, ctx: ToolCtx) -> Self {
        Self { registry, ctx }
    }

    /// Handle one message. Notifications (no `id`) never get a response.
    pub async fn handle(&self, req: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if req.jsonrpc != JSONRPC_VERSION {
            let id = req.id?;
            return Some(JsonRpcResponse::failure(
                id,
                JsonRpcError::invalid_request("jsonrpc must be \"2.0\""),
            ));
        }

        let outcome = match req.method.as_str() {
            "initialize" => self.initialize(req.params),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.registry.definitions() })),
            "tools/call" => self.call_tool(req.params).await,
            m if m.starts_with("notifications/") => {
                tracing::debug!(method = m, "notification");
                return None;
            }
            other => Err(JsonRpcError::method_not_found(other)),
        };

        let id = req.id?;
        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::failure(id, err),
        })
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: InitializeParams = match params {
            Some(p) => serde_json::from_value(p).map_err(JsonRpcError::invalid_params)?,
            None => InitializeParams::default(),
        };
        let protocol_version = params
            .protocol_version
            .as_deref()
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0])
            .to_string();
        if let Some(client) = &params.client_info {
            tracing::info!(client = %client.name, version = %client.version, %protocol_version, "client initialized");
        }
        let result = InitializeResult {
            protocol_version,
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        };
        serde_json::to_value(result).map_err(JsonRpcError::internal)
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("missing params"))
            .and_then(|p| serde_json::from_value(p).map_err(JsonRpcError::invalid_params))?;
        let args = params.arguments.unwrap_or(Value::Null);
        let res = self.registry.execute(&self.ctx, &params.name, &args).await;
        serde_json::to_value(CallToolResult::text(res.text, res.is_error))
            .map_err(JsonRpcError::internal)
    }
}
