#![allow(dead_code)]

use std::path::PathBuf;

use serde_json::Value;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use wecom_bot::tools::ToolCtx;
use wecom_bot::wecom::WecomClient;

pub const SEND_PATH: &str = "/cgi-bin/webhook/send";
pub const UPLOAD_PATH: &str = "/cgi-bin/webhook/upload_media";
pub const TEST_KEY: &str = "ce3ba63d-36bb-4681-8a07-0426557fc25a";

/// Stand-in for qyapi.weixin.qq.com.
pub struct MockWecom {
    pub server: MockServer,
}

impl MockWecom {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Scheme + host for `ToolCtx.api_base` / `WecomClient::new`.
    pub fn api_base(&self) -> String {
        self.server.uri()
    }

    pub fn ctx(&self) -> ToolCtx {
        ToolCtx::new(self.api_base()).expect("tool ctx")
    }

    pub fn client(&self) -> WecomClient {
        WecomClient::new(reqwest::Client::new(), self.api_base(), TEST_KEY)
    }

    /// Mount a POST /cgi-bin/webhook/send responder returning `body`.
    pub async fn mock_send(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mount a POST /cgi-bin/webhook/upload_media responder returning `body`.
    pub async fn mock_upload(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// JSON body of the only request received.
    pub async fn single_json_body(&self) -> Value {
        let reqs = self.requests().await;
        assert_eq!(reqs.len(), 1, "expected exactly one request");
        serde_json::from_slice(&reqs[0].body).expect("request body is JSON")
    }
}

/// A file in a fresh temp dir; keep the `TempDir` alive for the test.
pub fn temp_file(name: &str, contents: &[u8]) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let path = tmp.path().join(name);
    std::fs::write(&path, contents).unwrap();
    (tmp, path)
}

/// Base URL on which nothing is listening.
pub fn dead_api_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
