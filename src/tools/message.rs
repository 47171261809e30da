//! send_text, send_markdown, send_image, send_news, send_template_card.
//!
//! Each call decodes its arguments, builds a client for the supplied webhook key
//! and performs one send.

use serde_json::{Value, json};

use crate::tools::args::{
    self, SendImageArgs, SendMarkdownArgs, SendNewsArgs, SendTemplateCardArgs, SendTextArgs,
};
use crate::tools::context::ToolCtx;
use crate::tools::registry::{BoxFuture, Tool};
use crate::tools::result::ToolResult;

fn webhook_key_schema() -> Value {
    json!({ "type": "string", "description": "Webhook key of the WeCom group robot (the `key` query parameter of its webhook URL)" })
}

/// Object schema with `webhook_key` prepended to `properties` and `required`.
pub(crate) fn schema_with_key(properties: Value, required: &[&str]) -> Value {
    let mut props = serde_json::Map::new();
    props.insert("webhook_key".into(), webhook_key_schema());
    if let Value::Object(extra) = properties {
        props.extend(extra);
    }
    let mut req = vec!["webhook_key"];
    req.extend_from_slice(required);
    json!({
        "type": "object",
        "properties": props,
        "required": req
    })
}

/// send_text tool: plain text with optional @-mentions.
pub struct SendTextTool;

impl Tool for SendTextTool {
    fn name(&self) -> &str {
        "send_text"
    }

    fn description(&self) -> &str {
        "Send a text message to a WeCom group chat, optionally mentioning members by user id or mobile number."
    }

    fn parameters(&self) -> Value {
        schema_with_key(
            json!({
                "content": { "type": "string", "description": "Text content to send" },
                "mentioned_list": { "type": "string", "description": "Comma-separated user ids to mention, e.g. \"wangqing,@all\"" },
                "mentioned_mobile_list": { "type": "string", "description": "Comma-separated mobile numbers to mention, e.g. \"13800001111,@all\"" }
            }),
            &["content"],
        )
    }

    fn execute<'a>(&'a self, ctx: &'a ToolCtx, args: &'a Value) -> BoxFuture<'a, ToolResult> {
        Box::pin(async move {
            let a: SendTextArgs = match args::decode(args) {
                Ok(a) => a,
                Err(e) => return ToolResult::error(e.to_string()),
            };
            let outcome = ctx
                .client_for(&a.webhook_key)
                .send_text(a.content, a.mentioned_list, a.mentioned_mobile_list)
                .await;
            ToolResult::from_outcome(outcome, "send text message failed", |_| {
                "text message sent".into()
            })
        })
    }
}

/// send_markdown tool.
pub struct SendMarkdownTool;

impl Tool for SendMarkdownTool {
    fn name(&self) -> &str {
        "send_markdown"
    }

    fn description(&self) -> &str {
        "Send a Markdown message to a WeCom group chat."
    }

    fn parameters(&self) -> Value {
        schema_with_key(
            json!({
                "content": { "type": "string", "description": "Markdown content to send" }
            }),
            &["content"],
        )
    }

    fn execute<'a>(&'a self, ctx: &'a ToolCtx, args: &'a Value) -> BoxFuture<'a, ToolResult> {
        Box::pin(async move {
            let a: SendMarkdownArgs = match args::decode(args) {
                Ok(a) => a,
                Err(e) => return ToolResult::error(e.to_string()),
            };
            let outcome = ctx.client_for(&a.webhook_key).send_markdown(a.content).await;
            ToolResult::from_outcome(outcome, "send markdown message failed", |_| {
                "markdown message sent".into()
            })
        })
    }
}

/// send_image tool: base64 body plus its md5, forwarded unchecked.
pub struct SendImageTool;

impl Tool for SendImageTool {
    fn name(&self) -> &str {
        "send_image"
    }

    fn description(&self) -> &str {
        "Send an image message to a WeCom group chat. The image is given as base64 data with the MD5 of the raw bytes."
    }

    fn parameters(&self) -> Value {
        schema_with_key(
            json!({
                "base64_data": { "type": "string", "description": "Base64-encoded image bytes (JPG or PNG)" },
                "md5": { "type": "string", "description": "Hex MD5 of the image bytes before base64 encoding" }
            }),
            &["base64_data", "md5"],
        )
    }

    fn execute<'a>(&'a self, ctx: &'a ToolCtx, args: &'a Value) -> BoxFuture<'a, ToolResult> {
        Box::pin(async move {
            let a: SendImageArgs = match args::decode(args) {
                Ok(a) => a,
                Err(e) => return ToolResult::error(e.to_string()),
            };
            let outcome = ctx
                .client_for(&a.webhook_key)
                .send_image(a.base64_data, a.md5)
                .await;
            ToolResult::from_outcome(outcome, "send image message failed", |_| {
                "image message sent".into()
            })
        })
    }
}

/// send_news tool: one article card.
pub struct SendNewsTool;

impl Tool for SendNewsTool {
    fn name(&self) -> &str {
        "send_news"
    }

    fn description(&self) -> &str {
        "Send a news (article link card) message to a WeCom group chat."
    }

    fn parameters(&self) -> Value {
        schema_with_key(
            json!({
                "title": { "type": "string", "description": "Article title" },
                "description": { "type": "string", "description": "Article summary" },
                "url": { "type": "string", "description": "Link opened when the card is clicked" },
                "picurl": { "type": "string", "description": "Cover image URL" }
            }),
            &["title", "url"],
        )
    }

    fn execute<'a>(&'a self, ctx: &'a ToolCtx, args: &'a Value) -> BoxFuture<'a, ToolResult> {
        Box::pin(async move {
            let a: SendNewsArgs = match args::decode(args) {
                Ok(a) => a,
                Err(e) => return ToolResult::error(e.to_string()),
            };
            let client = ctx.client_for(&a.webhook_key);
            let outcome = client.send_news(a.into_articles()).await;
            ToolResult::from_outcome(outcome, "send news message failed", |_| {
                "news message sent".into()
            })
        })
    }
}

/// send_template_card tool.
pub struct SendTemplateCardTool;

impl Tool for SendTemplateCardTool {
    fn name(&self) -> &str {
        "send_template_card"
    }

    fn description(&self) -> &str {
        "Send a template card message to a WeCom group chat."
    }

    fn parameters(&self) -> Value {
        schema_with_key(
            json!({
                "card_type": { "type": "string", "description": "Template card type, e.g. \"text_notice\" or \"news_notice\"" },
                "main_title": { "type": "string", "description": "Card main title" },
                "main_desc": { "type": "string", "description": "Card main description" },
                "card_action_type": { "type": "number", "description": "Card click action: 1 = open URL, 2 = open mini program" },
                "card_action_url": { "type": "string", "description": "URL opened when action type is 1" },
                "card_action_appid": { "type": "string", "description": "Mini program app id when action type is 2" },
                "card_action_pagepath": { "type": "string", "description": "Mini program page path when action type is 2" }
            }),
            &["card_type", "main_title", "card_action_type"],
        )
    }

    fn execute<'a>(&'a self, ctx: &'a ToolCtx, args: &'a Value) -> BoxFuture<'a, ToolResult> {
        Box::pin(async move {
            let a: SendTemplateCardArgs = match args::decode(args) {
                Ok(a) => a,
                Err(e) => return ToolResult::error(e.to_string()),
            };
            let client = ctx.client_for(&a.webhook_key);
            let outcome = client.send_template_card(a.into_card()).await;
            ToolResult::from_outcome(outcome, "send template card message failed", |_| {
                "template card message sent".into()
            })
        })
    }
}
