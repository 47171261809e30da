//! Config load: missing file, invalid TOML, env overrides, validation.

use std::path::PathBuf;

use wecom_bot::config::{self, ConfigError};
use wecom_bot::wecom::DEFAULT_API_BASE;

/// Invalid TOML in config file → Parse error.
#[test]
fn test_config_invalid_toml_fails_parse() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "not valid toml {{{").unwrap();

    let err = config::load(&path).expect_err("load with invalid TOML should fail");
    match &err {
        ConfigError::Parse(msg) => assert!(!msg.is_empty()),
        _ => panic!("expected Parse error, got {:?}", err),
    }
}

/// Env-dependent cases run in one test: env vars are process-global.
#[test]
fn test_config_defaults_env_override_and_validation() {
    let _a = RestoreEnv::new("WECOM_BOT_API_BASE");
    let _b = RestoreEnv::new("WECOM_BOT_LOG_FORMAT");
    let _c = RestoreEnv::new("WECOM_BOT_LOG_LEVEL");
    // SAFETY: test only; restored by RestoreEnv::drop.
    unsafe {
        std::env::remove_var("WECOM_BOT_API_BASE");
        std::env::remove_var("WECOM_BOT_LOG_FORMAT");
        std::env::remove_var("WECOM_BOT_LOG_LEVEL");
    }

    // Missing file → defaults.
    let missing = PathBuf::from("/nonexistent/wecom-bot/config.toml");
    let cfg = config::load(&missing).expect("missing file falls back to defaults");
    assert_eq!(cfg.api_base(), DEFAULT_API_BASE);
    assert_eq!(cfg.log_level(), "info");

    // File values.
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[wecom]
api-base = "http://file-host:8080"
[log]
level = "debug"
"#,
    )
    .unwrap();
    let cfg = config::load(&path).unwrap();
    assert_eq!(cfg.api_base(), "http://file-host:8080");
    assert_eq!(cfg.log_level(), "debug");

    // Env wins over file.
    // SAFETY: as above.
    unsafe { std::env::set_var("WECOM_BOT_API_BASE", "https://env-host") };
    let cfg = config::load(&path).unwrap();
    assert_eq!(cfg.api_base(), "https://env-host");

    // Invalid override fails validation.
    // SAFETY: as above.
    unsafe { std::env::set_var("WECOM_BOT_API_BASE", "env-host-without-scheme") };
    match config::load(&path) {
        Err(ConfigError::Validation(msg)) => assert!(msg.contains("api-base"), "{msg}"),
        other => panic!("expected Validation error, got {:?}", other),
    }
    // SAFETY: as above.
    unsafe {
        std::env::remove_var("WECOM_BOT_API_BASE");
        std::env::set_var("WECOM_BOT_LOG_FORMAT", "xml");
    }
    assert!(matches!(
        config::load(&path),
        Err(ConfigError::Validation(_))
    ));
}

/// Restore an env var to its previous value (or remove if was unset).
struct RestoreEnv {
    key: String,
    previous: Option<String>,
}

impl RestoreEnv {
    fn new(key: &str) -> Self {
        let previous = std::env::var(key).ok();
        Self {
            key: key.to_string(),
            previous,
        }
    }
}

impl Drop for RestoreEnv {
    fn drop(&mut self) {
        // SAFETY: restoring env to state before test.
        unsafe {
            match &self.previous {
                Some(v) => std::env::set_var(&self.key, v),
                None => std::env::remove_var(&self.key),
            }
        }
    }
}
