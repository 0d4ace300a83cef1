//! Configuration management for the relay.
//!
//! Loads settings from /etc/aircon-relay/config.toml or uses defaults.
//! Secrets never live in code: `GEMINI_API_KEY` and `GEMINI_MODEL` from the
//! environment override whatever the file says.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Config file path
pub const CONFIG_PATH: &str = "/etc/aircon-relay/config.toml";

/// Environment variable holding the generator API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding the generator model
pub const MODEL_ENV: &str = "GEMINI_MODEL";

/// Short system prompt - the reply only needs room for one JSON object
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"Bạn là AI điều khiển điều hòa. Phân tích dữ liệu cảm biến hoặc câu lệnh và chỉ trả về JSON:
{"action":"turn_on|turn_off|adjust|maintain","temperature":25,"fan_speed":"QUIET|LOW|MEDIUM|HIGH|AUTO","mode":"COOL|DRY|FAN|HEAT|AUTO","reason":"lý do ngắn"}
Nhiệt độ trong khoảng 16-30."#;

/// Remote text generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Models collection URL, without the trailing model name
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Usually supplied through GEMINI_API_KEY instead
    #[serde(default)]
    pub api_key: Option<String>,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Sampling temperature (low - we want stable JSON)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output cap, just enough for the directive
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_timeout() -> u64 {
    20
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_output_tokens() -> u32 {
    256
}

fn default_top_p() -> f32 {
    0.8
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            top_p: default_top_p(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// generateContent URL without the key query parameter
    pub fn generate_url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// EnvFilter directive; RUST_LOG wins when set
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Relay configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RelayConfig {
    /// Parse TOML without consulting the environment
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RelayConfig = toml::from_str(content).context("Failed to parse relay config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, apply environment overrides, validate
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: RelayConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env_overrides();
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Like [`RelayConfig::load`], but a missing file means defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }
        info!("No config at {}, using defaults", path.display());
        let mut config = RelayConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from [`CONFIG_PATH`], or defaults when it does not exist
    pub fn load_default() -> Result<Self> {
        Self::load_or_default(Path::new(CONFIG_PATH))
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (the environment in production)
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.generator.api_key = Some(key.trim().to_string());
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            self.generator.model = model.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let g = &self.generator;
        if g.endpoint.trim().is_empty() {
            bail!("generator.endpoint must not be empty");
        }
        if g.model.trim().is_empty() {
            bail!("generator.model must not be empty");
        }
        if g.timeout_secs == 0 {
            bail!("generator.timeout_secs must be greater than 0");
        }
        if !(0.0..=2.0).contains(&g.temperature) {
            bail!("generator.temperature must be within 0.0-2.0, got {}", g.temperature);
        }
        if !(0.0..=1.0).contains(&g.top_p) {
            bail!("generator.top_p must be within 0.0-1.0, got {}", g.top_p);
        }
        if g.max_output_tokens == 0 {
            bail!("generator.max_output_tokens must be greater than 0");
        }
        EnvFilter::try_new(&self.logging.filter)
            .with_context(|| format!("Invalid logging.filter '{}'", self.logging.filter))?;
        Ok(())
    }
}
