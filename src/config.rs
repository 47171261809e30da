//! Config load, env overrides, validation.
//!
//! The webhook key is deliberately absent: every tool call carries its own.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::wecom::DEFAULT_API_BASE;

/// Root config: remote API host and logging.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub wecom: Option<WecomConfig>,
    pub log: Option<LogConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WecomConfig {
    /// Scheme + host of the webhook API, without path.
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. "info" or "wecom_bot=debug".
    pub level: Option<String>,
    /// "text" (default) or "json".
    pub format: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse: {0}")]
    Parse(String),
    #[error("config invalid: {0}")]
    Validation(String),
}

impl Config {
    pub fn api_base(&self) -> &str {
        self.wecom
            .as_ref()
            .and_then(|w| w.api_base.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_API_BASE)
    }

    pub fn log_level(&self) -> &str {
        self.log
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or("info")
    }

    pub fn log_json(&self) -> bool {
        self.log
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

/// `$WECOM_BOT_CONFIG`, else `~/.wecom-bot/config.toml`.
pub fn default_config_path() -> PathBuf {
    if let Ok(p) = std::env::var("WECOM_BOT_CONFIG") {
        if !p.is_empty() {
            return PathBuf::from(p);
        }
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".wecom-bot").join("config.toml")
}

/// Load from `path` (missing file = defaults), apply env overrides, validate.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let mut cfg = match std::fs::read_to_string(path) {
        Ok(s) => toml::from_str::<Config>(&s).map_err(|e| ConfigError::Parse(e.to_string()))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            });
        }
    };
    apply_env(&mut cfg);
    validate(&cfg)?;
    Ok(cfg)
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn apply_env(cfg: &mut Config) {
    if let Some(v) = env_nonempty("WECOM_BOT_API_BASE") {
        cfg.wecom.get_or_insert_with(Default::default).api_base = Some(v);
    }
    if let Some(v) = env_nonempty("WECOM_BOT_LOG_LEVEL") {
        cfg.log.get_or_insert_with(Default::default).level = Some(v);
    }
    if let Some(v) = env_nonempty("WECOM_BOT_LOG_FORMAT") {
        cfg.log.get_or_insert_with(Default::default).format = Some(v);
    }
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let base = cfg.api_base();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(ConfigError::Validation(format!(
            "wecom.api-base must start with http:// or https:// (got '{base}')"
        )));
    }
    if let Some(format) = cfg.log.as_ref().and_then(|l| l.format.as_deref()) {
        if !matches!(format.to_ascii_lowercase().as_str(), "text" | "json") {
            return Err(ConfigError::Validation(format!(
                "log.format must be \"text\" or \"json\" (got '{format}')"
            )));
        }
    }
    Ok(())
}
