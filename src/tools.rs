//! Tool registry and the webhook tools: send_text, send_markdown, send_image,
//! send_news, send_template_card, upload_file.

pub mod args;
pub mod context;
pub mod message;
pub mod registry;
pub mod result;
pub mod upload;

pub use context::ToolCtx;
pub use registry::{Tool, ToolRegistry, build_registry, tool_to_def};
pub use result::ToolResult;
