//! Register tools by name; name, description, JSON schema, execute(ctx, args) -> ToolResult.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::mcp::protocol::ToolDefinition;
use crate::tools::context::ToolCtx;
use crate::tools::message::{
    SendImageTool, SendMarkdownTool, SendNewsTool, SendTemplateCardTool, SendTextTool,
};
use crate::tools::result::ToolResult;
use crate::tools::upload::UploadFileTool;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A single tool: name, description, JSON schema for args, and execute.
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> Value;
    fn execute<'a>(&'a self, ctx: &'a ToolCtx, args: &'a Value) -> BoxFuture<'a, ToolResult>;
}

/// Convert a tool to its MCP listing entry.
#[inline]
pub fn tool_to_def(tool: &dyn Tool) -> ToolDefinition {
    ToolDefinition {
        name: tool.name().to_string(),
        description: tool.description().to_string(),
        input_schema: tool.parameters(),
    }
}

/// Registry of tools by name. Thread-safe.
#[derive(Default)]
pub struct ToolRegistry {
    inner: RwLock<HashMap<String, Arc<dyn Tool + Send + Sync>>>,
}

impl ToolRegistry {
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Register a tool by its name. Overwrites if name already exists.
    pub fn register<T: Tool + Send + Sync + 'static>(&self, tool: T) {
        let name = tool.name().to_string();
        self.inner
            .write()
            .expect("registry lock")
            .insert(name, Arc::new(tool));
    }

    /// Execute tool by name. Returns error result if not found.
    pub async fn execute(&self, ctx: &ToolCtx, name: &str, args: &Value) -> ToolResult {
        let tool = {
            let guard = self.inner.read().expect("registry lock");
            guard.get(name).cloned()
        };

        let Some(tool) = tool else {
            tracing::warn!(tool = name, "unknown tool");
            return ToolResult::error(format!("tool '{name}' not found"));
        };
        let res = tool.execute(ctx, args).await;
        if res.is_error {
            tracing::warn!(tool = name, error = %res.text, "tool call failed");
        } else {
            tracing::info!(tool = name, "tool call succeeded");
        }
        res
    }

    /// All tool definitions, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let guard = self.inner.read().expect("registry lock");
        let mut defs: Vec<ToolDefinition> = guard.values().map(|t| tool_to_def(t.as_ref())).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Sorted list of tool names.
    pub fn list(&self) -> Vec<String> {
        let guard = self.inner.read().expect("registry lock");
        let mut names: Vec<String> = guard.keys().cloned().collect();
        names.sort();
        names
    }
}

/// The six webhook tools.
pub fn build_registry() -> ToolRegistry {
    let reg = ToolRegistry::new();
    reg.register(SendTextTool);
    reg.register(SendMarkdownTool);
    reg.register(SendImageTool);
    reg.register(SendNewsTool);
    reg.register(SendTemplateCardTool);
    reg.register(UploadFileTool);
    reg
}
