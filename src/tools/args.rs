//! Typed tool arguments. One struct per tool, decoded from the raw JSON object in a
//! single step; a missing or mistyped required field is an [`ArgsError`] naming
//! that field, never a default.

use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::wecom::{Article, TemplateCard};

#[derive(Debug, Error)]
pub enum ArgsError {
    #[error("invalid arguments: {0}")]
    Decode(String),
    #[error("webhook_key must be a non-empty string")]
    EmptyKey,
}

/// Every tool's arguments carry the endpoint key for that call.
pub trait ToolArgs: DeserializeOwned {
    fn webhook_key(&self) -> &str;
}

/// Decode and check `webhook_key`. Absent arguments (`null`) are treated as `{}`.
/// Errors carry the path of the offending field, e.g. `card_action_type: invalid type ...`.
pub fn decode<T: ToolArgs>(args: &Value) -> Result<T, ArgsError> {
    let empty = Value::Object(Default::default());
    let args = if args.is_null() { &empty } else { args };
    let parsed: T =
        serde_path_to_error::deserialize(args).map_err(|e| ArgsError::Decode(e.to_string()))?;
    if parsed.webhook_key().is_empty() {
        return Err(ArgsError::EmptyKey);
    }
    Ok(parsed)
}

/// Split a comma-separated list and trim each element. Empty elements are kept
/// (`"a,,b"` gives `["a", "", "b"]`); only an empty string gives an empty list.
pub fn split_list(s: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    s.split(',').map(|s| s.trim().to_string()).collect()
}

fn comma_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(split_list(&s)),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|v| match v {
                Value::String(s) => Ok(s.trim().to_string()),
                other => Err(D::Error::custom(format!(
                    "expected a string list element, got {other}"
                ))),
            })
            .collect(),
        Some(other) => Err(D::Error::custom(format!(
            "expected a comma-separated string or an array of strings, got {other}"
        ))),
    }
}

/// Optional string: anything that is not a JSON string reads as `""`.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

#[derive(Debug, Deserialize)]
pub struct SendTextArgs {
    pub webhook_key: String,
    pub content: String,
    #[serde(default, deserialize_with = "comma_list")]
    pub mentioned_list: Vec<String>,
    #[serde(default, deserialize_with = "comma_list")]
    pub mentioned_mobile_list: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMarkdownArgs {
    pub webhook_key: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SendImageArgs {
    pub webhook_key: String,
    pub base64_data: String,
    pub md5: String,
}

#[derive(Debug, Deserialize)]
pub struct SendNewsArgs {
    pub webhook_key: String,
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    pub url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub picurl: String,
}

impl SendNewsArgs {
    /// The tool sends exactly one article.
    pub fn into_articles(self) -> Vec<Article> {
        vec![Article {
            title: self.title,
            description: self.description,
            url: self.url,
            picurl: self.picurl,
        }]
    }
}

#[derive(Debug, Deserialize)]
pub struct SendTemplateCardArgs {
    pub webhook_key: String,
    pub card_type: String,
    pub main_title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub main_desc: String,
    /// Any JSON number; fractional values are truncated.
    pub card_action_type: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub card_action_url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub card_action_appid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub card_action_pagepath: String,
}

impl SendTemplateCardArgs {
    pub fn into_card(self) -> TemplateCard {
        TemplateCard {
            card_type: self.card_type,
            main_title: self.main_title,
            main_desc: self.main_desc,
            card_action_type: self.card_action_type as i64,
            card_action_url: self.card_action_url,
            card_action_appid: self.card_action_appid,
            card_action_pagepath: self.card_action_pagepath,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadFileArgs {
    pub webhook_key: String,
    pub file_path: String,
}

macro_rules! impl_tool_args {
    ($($t:ty),* $(,)?) => {
        $(impl ToolArgs for $t {
            fn webhook_key(&self) -> &str {
                &self.webhook_key
            }
        })*
    };
}

impl_tool_args!(
    SendTextArgs,
    SendMarkdownArgs,
    SendImageArgs,
    SendNewsArgs,
    SendTemplateCardArgs,
    UploadFileArgs,
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_list_trims_and_keeps_empty_elements() {
        assert_eq!(split_list("a, b ,c"), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
        assert_eq!(split_list("a,,b,"), vec!["a", "", "b", ""]);
        assert_eq!(split_list(" u1 ,, u2 "), vec!["u1", "", "u2"]);
    }

    #[test]
    fn text_args_mentions_from_string_array_or_absent() {
        let a: SendTextArgs = decode(&json!({
            "webhook_key": "k",
            "content": "hi",
            "mentioned_list": "a, b ,c",
            "mentioned_mobile_list": ["138", " 139 "]
        }))
        .unwrap();
        assert_eq!(a.mentioned_list, vec!["a", "b", "c"]);
        assert_eq!(a.mentioned_mobile_list, vec!["138", "139"]);

        let a: SendTextArgs = decode(&json!({ "webhook_key": "k", "content": "" })).unwrap();
        assert!(a.mentioned_list.is_empty());
        assert!(a.mentioned_mobile_list.is_empty());
        assert_eq!(a.content, "");

        let a: SendTextArgs =
            decode(&json!({ "webhook_key": "k", "content": "x", "mentioned_list": null })).unwrap();
        assert!(a.mentioned_list.is_empty());

        let a: SendTextArgs = decode(&json!({
            "webhook_key": "k",
            "content": "x",
            "mentioned_list": "a,,b,",
            "mentioned_mobile_list": ["1", " "]
        }))
        .unwrap();
        assert_eq!(a.mentioned_list, vec!["a", "", "b", ""]);
        assert_eq!(a.mentioned_mobile_list, vec!["1", ""]);
    }

    #[test]
    fn mistyped_field_error_names_the_field() {
        let err = decode::<SendTextArgs>(&json!({
            "webhook_key": "k",
            "content": "x",
            "mentioned_list": 7
        }))
        .unwrap_err();
        assert!(err.to_string().contains("mentioned_list"), "{err}");

        let err = decode::<SendTemplateCardArgs>(&json!({
            "webhook_key": "k",
            "card_type": "text_notice",
            "main_title": "t",
            "card_action_type": "one"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("card_action_type"), "{err}");
    }

    #[test]
    fn missing_or_mistyped_required_field_is_rejected() {
        let err = decode::<SendTextArgs>(&json!({ "webhook_key": "k" })).unwrap_err();
        assert!(err.to_string().contains("content"), "{err}");

        let err = decode::<SendMarkdownArgs>(&json!({ "webhook_key": "k", "content": 5 })).unwrap_err();
        assert!(matches!(err, ArgsError::Decode(_)));

        let err = decode::<UploadFileArgs>(&Value::Null).unwrap_err();
        assert!(err.to_string().contains("webhook_key"), "{err}");
    }

    #[test]
    fn empty_webhook_key_is_rejected() {
        let err = decode::<SendMarkdownArgs>(&json!({ "webhook_key": "", "content": "x" })).unwrap_err();
        assert!(matches!(err, ArgsError::EmptyKey));

        // Only the empty string is rejected; anything else is passed on to the remote API.
        let a: SendMarkdownArgs = decode(&json!({ "webhook_key": " ", "content": "x" })).unwrap();
        assert_eq!(a.webhook_key, " ");
    }

    #[test]
    fn template_card_action_type_must_be_number() {
        let base = json!({
            "webhook_key": "k",
            "card_type": "text_notice",
            "main_title": "t",
        });

        let mut args = base.clone();
        args["card_action_type"] = json!("1");
        assert!(decode::<SendTemplateCardArgs>(&args).is_err());

        let mut args = base.clone();
        args["card_action_type"] = json!(2.9);
        let card = decode::<SendTemplateCardArgs>(&args).unwrap().into_card();
        assert_eq!(card.card_action_type, 2);
        assert_eq!(card.main_desc, "");
        assert_eq!(card.card_action_url, "");

        assert!(decode::<SendTemplateCardArgs>(&base).is_err());
    }

    #[test]
    fn news_optional_fields_default_empty() {
        let a: SendNewsArgs = decode(&json!({
            "webhook_key": "k",
            "title": "t",
            "url": "https://example.com",
            "description": 5,
            "picurl": null
        }))
        .unwrap();
        let articles = a.into_articles();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].description, "");
        assert_eq!(articles[0].picurl, "");
    }
}
