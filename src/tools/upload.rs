//! upload_file: push a local file to upload_media and report the media id.

use serde_json::{Value, json};

use crate::tools::args::{self, UploadFileArgs};
use crate::tools::context::ToolCtx;
use crate::tools::message::schema_with_key;
use crate::tools::registry::{BoxFuture, Tool};
use crate::tools::result::ToolResult;

/// upload_file tool. The path is resolved by the server process, not the caller.
pub struct UploadFileTool;

impl Tool for UploadFileTool {
    fn name(&self) -> &str {
        "upload_file"
    }

    fn description(&self) -> &str {
        "Upload a local file to WeCom and return its media id (valid for 3 days)."
    }

    fn parameters(&self) -> Value {
        schema_with_key(
            json!({
                "file_path": { "type": "string", "description": "Path of the file to upload, readable by the server process" }
            }),
            &["file_path"],
        )
    }

    fn execute<'a>(&'a self, ctx: &'a ToolCtx, args: &'a Value) -> BoxFuture<'a, ToolResult> {
        Box::pin(async move {
            let a: UploadFileArgs = match args::decode(args) {
                Ok(a) => a,
                Err(e) => return ToolResult::error(e.to_string()),
            };
            let outcome = ctx.client_for(&a.webhook_key).upload_file(&a.file_path).await;
            ToolResult::from_outcome(outcome, "upload file failed", |id| {
                format!("file uploaded, media id: {id}")
            })
        })
    }
}
