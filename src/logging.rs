//! Tracing subscriber setup. Always writes to stderr: stdout carries JSON-RPC.

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
/// Returns an error if a subscriber is already set.
pub fn init(cfg: &Config) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(cfg.log_level()))
        .map_err(|e| format!("log level: {e}"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);

    let res = if cfg.log_json() {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    res.map_err(|e| e.to_string())
}
