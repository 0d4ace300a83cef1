//! Tracing setup for a host process embedding the relay.

use crate::config::LoggingConfig;
use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber.
///
/// RUST_LOG takes precedence over `config.filter`. Fails instead of panicking
/// when the host already installed a subscriber.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .with_context(|| format!("Invalid log filter '{}'", config.filter))?,
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .without_time()
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}

/// First `max_chars` characters, with an ellipsis when cut
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
