//! wecom-bot-mcp: MCP server on stdio exposing WeCom group-robot webhook tools.
//!
//! Config: `~/.wecom-bot/config.toml` (or `$WECOM_BOT_CONFIG`) plus env overrides.
//! Logs go to stderr; stdout is reserved for the protocol.

use std::sync::Arc;

use wecom_bot::config;
use wecom_bot::logging;
use wecom_bot::mcp::{self, McpServer};
use wecom_bot::tools::{self, ToolCtx};

#[tokio::main]
async fn main() {
    let path = config::default_config_path();
    let cfg = match config::load(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = logging::init(&cfg) {
        eprintln!("logging: {}", e);
    }

    let ctx = match ToolCtx::new(cfg.api_base()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "http client");
            std::process::exit(1);
        }
    };
    let registry = tools::build_registry();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        api_base = cfg.api_base(),
        tools = registry.list().len(),
        "starting {} on stdio",
        mcp::SERVER_NAME
    );

    let server = Arc::new(McpServer::new(registry, ctx));
    if let Err(e) = mcp::serve_stdio(server).await {
        tracing::error!(error = %e, "stdio transport failed");
        std::process::exit(1);
    }
    tracing::info!("stdin closed, exiting");
}
