//! Newline-delimited JSON-RPC over a byte stream (stdio in production).
//!
//! Reader loop decodes lines and spawns one task per message; a single writer task
//! serializes responses so lines never interleave.

use std::io;
use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::mcp::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::mcp::server::McpServer;

const OUTBOUND_CAP: usize = 64;

/// Decode one input line: a request, or the error response to send back.
fn decode_line(line: &str) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| JsonRpcResponse::failure(Value::Null, JsonRpcError::parse_error(e)))?;
    let id = value.get("id").cloned().unwrap_or(Value::Null);
    if !value.is_object() {
        return Err(JsonRpcResponse::failure(
            id,
            JsonRpcError::invalid_request("expected a JSON object (batches are not supported)"),
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| JsonRpcResponse::failure(id, JsonRpcError::invalid_request(e)))
}

/// Run one request on its own task. A panicking handler still answers the
/// request id with an internal error so the host is not left waiting.
async fn dispatch(server: Arc<McpServer>, req: JsonRpcRequest) -> Option<JsonRpcResponse> {
    let id = req.id.clone();
    let method = req.method.clone();
    match tokio::spawn(async move { server.handle(req).await }).await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::error!(method = %method, error = %e, "request handler failed");
            id.map(|id| {
                JsonRpcResponse::failure(id, JsonRpcError::internal("request handler panicked"))
            })
        }
    }
}

/// Serve until `reader` hits EOF and every in-flight request has been answered.
pub async fn serve<R, W>(server: Arc<McpServer>, reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<JsonRpcResponse>(OUTBOUND_CAP);

    let writer_task = tokio::spawn(async move {
        while let Some(resp) = rx.recv().await {
            let mut line = match serde_json::to_vec(&resp) {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode response");
                    continue;
                }
            };
            line.push(b'\n');
            writer.write_all(&line).await?;
            writer.flush().await?;
        }
        Ok::<(), io::Error>(())
    });

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match decode_line(line) {
            Ok(req) => {
                let server = Arc::clone(&server);
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Some(resp) = dispatch(server, req).await {
                        // Receiver gone means the writer failed; nothing left to report to.
                        let _ = tx.send(resp).await;
                    }
                });
            }
            Err(resp) => {
                tracing::warn!(error = ?resp.error, "rejected input line");
                if tx.send(resp).await.is_err() {
                    break;
                }
            }
        }
    }
    drop(tx);

    writer_task.await.map_err(io::Error::other)?
}

/// Serve on the process's stdin/stdout.
pub async fn serve_stdio(server: Arc<McpServer>) -> io::Result<()> {
    serve(server, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}
