//! Execution context for tools: remote API base and shared HTTP pool.

use crate::wecom::{self, WecomClient};

/// Context passed into each tool execution. Carries no credentials.
#[derive(Clone)]
pub struct ToolCtx {
    /// Scheme + host of the webhook API (e.g. `https://qyapi.weixin.qq.com`).
    pub api_base: String,
    /// Connection pool shared by per-call clients.
    pub http: reqwest::Client,
}

impl ToolCtx {
    pub fn new(api_base: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            api_base: api_base.into(),
            http: wecom::http_client()?,
        })
    }

    /// Fresh client for one call, bound to the caller-supplied key.
    pub fn client_for(&self, webhook_key: &str) -> WecomClient {
        WecomClient::new(self.http.clone(), self.api_base.clone(), webhook_key)
    }
}
