//! WeCom group-robot webhook client: send text/markdown/image/news/template_card, upload_media.
//!
//! One client per endpoint key; one HTTP attempt per call. No retries, no SDK.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://qyapi.weixin.qq.com";
const SEND_PATH: &str = "/cgi-bin/webhook/send";
const UPLOAD_PATH: &str = "/cgi-bin/webhook/upload_media";
const UPLOAD_FIELD: &str = "media";
const USER_AGENT: &str = concat!("wecom-bot-mcp/", env!("CARGO_PKG_VERSION"));

// --- Errors ---

/// Failure of a send call. `Api` means the remote service answered and rejected the
/// message; `Transport` and `Decode` mean the exchange never completed cleanly.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("wecom http: {0}")]
    Transport(String),
    #[error("wecom decode: {0}")]
    Decode(String),
    #[error("wecom api error {code}: {message}")]
    Api { code: i64, message: String },
}

/// Failure of an upload call.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Local file could not be read; no request was made.
    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Request(#[from] SendError),
    /// Remote reported success but the body carries no usable `media_id`.
    #[error("wecom protocol: {0}")]
    Protocol(String),
}

/// Format a reqwest error and its source chain (surfaces TLS, DNS, connect errors).
fn format_error_chain(e: &impl std::error::Error) -> String {
    let mut s = e.to_string();
    let mut src = e.source();
    while let Some(inner) = src {
        s.push_str(" | ");
        s.push_str(&inner.to_string());
        src = inner.source();
    }
    s
}

// --- Message kinds ---

/// One news article. `title` and `url` are required by the remote API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub picurl: String,
}

/// Template card parameters, flat. Serialized in the nested `main_title` /
/// `card_action` shape the webhook expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "TemplateCardWire", from = "TemplateCardWire")]
pub struct TemplateCard {
    pub card_type: String,
    pub main_title: String,
    pub main_desc: String,
    pub card_action_type: i64,
    pub card_action_url: String,
    pub card_action_appid: String,
    pub card_action_pagepath: String,
}

#[derive(Serialize, Deserialize)]
struct TemplateCardWire {
    card_type: String,
    main_title: MainTitleWire,
    card_action: CardActionWire,
}

#[derive(Serialize, Deserialize)]
struct MainTitleWire {
    title: String,
    #[serde(default)]
    desc: String,
}

#[derive(Serialize, Deserialize)]
struct CardActionWire {
    #[serde(rename = "type")]
    type_: i64,
    #[serde(default)]
    url: String,
    #[serde(default)]
    appid: String,
    #[serde(default)]
    pagepath: String,
}

impl From<TemplateCard> for TemplateCardWire {
    fn from(c: TemplateCard) -> Self {
        Self {
            card_type: c.card_type,
            main_title: MainTitleWire {
                title: c.main_title,
                desc: c.main_desc,
            },
            card_action: CardActionWire {
                type_: c.card_action_type,
                url: c.card_action_url,
                appid: c.card_action_appid,
                pagepath: c.card_action_pagepath,
            },
        }
    }
}

impl From<TemplateCardWire> for TemplateCard {
    fn from(w: TemplateCardWire) -> Self {
        Self {
            card_type: w.card_type,
            main_title: w.main_title.title,
            main_desc: w.main_title.desc,
            card_action_type: w.card_action.type_,
            card_action_url: w.card_action.url,
            card_action_appid: w.card_action.appid,
            card_action_pagepath: w.card_action.pagepath,
        }
    }
}

/// A webhook message. The variant name (snake_case) is both the `msgtype`
/// discriminator and the key of the nested body object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Message {
    Text {
        content: String,
        #[serde(default)]
        mentioned_list: Vec<String>,
        #[serde(default)]
        mentioned_mobile_list: Vec<String>,
    },
    Markdown {
        content: String,
    },
    Image {
        base64: String,
        md5: String,
    },
    News {
        articles: Vec<Article>,
    },
    TemplateCard(TemplateCard),
}

#[derive(Serialize)]
struct OutgoingPayload<'a> {
    msgtype: &'a str,
    #[serde(flatten)]
    message: &'a Message,
}

#[derive(Deserialize)]
struct IncomingPayload {
    msgtype: String,
    #[serde(flatten)]
    message: Message,
}

impl Message {
    pub fn msgtype(&self) -> &'static str {
        match self {
            Message::Text { .. } => "text",
            Message::Markdown { .. } => "markdown",
            Message::Image { .. } => "image",
            Message::News { .. } => "news",
            Message::TemplateCard(_) => "template_card",
        }
    }

    /// Wire body: `{"msgtype": kind, kind: {...}}`.
    pub fn to_payload(&self) -> serde_json::Result<Value> {
        serde_json::to_value(OutgoingPayload {
            msgtype: self.msgtype(),
            message: self,
        })
    }

    /// Inverse of [`Message::to_payload`]. Rejects a body whose `msgtype` does not
    /// name the nested object.
    pub fn from_payload(payload: Value) -> serde_json::Result<Self> {
        let incoming: IncomingPayload = serde_json::from_value(payload)?;
        if incoming.msgtype != incoming.message.msgtype() {
            return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                "msgtype '{}' does not match body '{}'",
                incoming.msgtype,
                incoming.message.msgtype()
            )));
        }
        Ok(incoming.message)
    }
}

// --- Response envelope ---

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: Option<String>,
    #[serde(default)]
    media_id: Option<Value>,
}

impl Envelope {
    fn check(self) -> Result<Self, SendError> {
        if self.errcode != 0 {
            return Err(SendError::Api {
                code: self.errcode,
                message: self.errmsg.unwrap_or_default(),
            });
        }
        Ok(self)
    }
}

/// Opaque id returned by `upload_media`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaId(pub String);

impl MediaId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// HTTP client for webhook calls (no timeout beyond reqwest's default).
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}

// --- Client ---

/// Webhook client bound to one endpoint key.
pub struct WecomClient {
    http: reqwest::Client,
    api_base: String,
    key: String,
}

impl WecomClient {
    pub fn new(http: reqwest::Client, api_base: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            key: key.into(),
        }
    }

    /// Client against the public WeCom host with a fresh connection pool.
    pub fn with_default_base(key: impl Into<String>) -> Self {
        Self::new(reqwest::Client::new(), DEFAULT_API_BASE, key)
    }

    fn endpoint(&self, path: &str, extra: &[(&str, &str)]) -> Result<reqwest::Url, SendError> {
        let mut params = vec![("key", self.key.as_str())];
        params.extend_from_slice(extra);
        let base = self.api_base.trim_end_matches('/');
        reqwest::Url::parse_with_params(&format!("{base}{path}"), &params)
            .map_err(|e| SendError::Transport(format!("invalid endpoint url: {e}")))
    }

    pub async fn send_text(
        &self,
        content: impl Into<String>,
        mentioned_list: Vec<String>,
        mentioned_mobile_list: Vec<String>,
    ) -> Result<(), SendError> {
        self.send(&Message::Text {
            content: content.into(),
            mentioned_list,
            mentioned_mobile_list,
        })
        .await
    }

    pub async fn send_markdown(&self, content: impl Into<String>) -> Result<(), SendError> {
        self.send(&Message::Markdown {
            content: content.into(),
        })
        .await
    }

    /// `base64` and `md5` are forwarded unchecked; a mismatch is reported by the remote side.
    pub async fn send_image(
        &self,
        base64: impl Into<String>,
        md5: impl Into<String>,
    ) -> Result<(), SendError> {
        self.send(&Message::Image {
            base64: base64.into(),
            md5: md5.into(),
        })
        .await
    }

    pub async fn send_news(&self, articles: Vec<Article>) -> Result<(), SendError> {
        self.send(&Message::News { articles }).await
    }

    pub async fn send_template_card(&self, card: TemplateCard) -> Result<(), SendError> {
        self.send(&Message::TemplateCard(card)).await
    }

    /// POST one message to the send endpoint and check the envelope.
    pub async fn send(&self, message: &Message) -> Result<(), SendError> {
        let url = self.endpoint(SEND_PATH, &[])?;
        let msgtype = message.msgtype();
        tracing::debug!(msgtype, "posting webhook message");
        let res = self
            .http
            .post(url)
            .json(&OutgoingPayload { msgtype, message })
            .send()
            .await
            .map_err(|e| SendError::Transport(format_error_chain(&e.without_url())))?;
        read_envelope(res).await?.check()?;
        Ok(())
    }

    /// Upload a local file as `type=file` media. The file is read before any request.
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<MediaId, UploadError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.map_err(|source| UploadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let url = self.endpoint(UPLOAD_PATH, &[("type", "file")])?;
        tracing::debug!(bytes = data.len(), "uploading webhook media");

        let part = Part::bytes(data).file_name(path.to_string_lossy().into_owned());
        let form = Form::new().part(UPLOAD_FIELD, part);
        let res = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SendError::Transport(format_error_chain(&e.without_url())))?;
        let envelope = read_envelope(res).await?.check()?;

        match envelope.media_id {
            Some(Value::String(id)) => Ok(MediaId(id)),
            Some(other) => Err(UploadError::Protocol(format!(
                "media_id is not a string: {other}"
            ))),
            None => Err(UploadError::Protocol("response has no media_id".into())),
        }
    }
}

/// Read the body and decode the envelope. HTTP status is not consulted beyond the
/// error text: the webhook reports failures in `errcode`.
async fn read_envelope(res: reqwest::Response) -> Result<Envelope, SendError> {
    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| SendError::Transport(format_error_chain(&e.without_url())))?;
    serde_json::from_str(&body).map_err(|e| {
        SendError::Decode(format!("{e} (status {status}, body: {})", body.trim()))
    })
}
