//! wecom-bot library: webhook client, tools, MCP stdio server, config, logging.

pub mod config;
pub mod logging;
pub mod mcp;
pub mod tools;
pub mod wecom;
