use crate::error::limit_message;
use crate::provider::ProviderTag;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Opaque per-provider settings, handed through to the provider clients
pub type ProviderSettings = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    /// Provider used when a request does not name one
    #[serde(default = "default_provider")]
    pub default_provider: ProviderTag,

    /// Chargeable completions allowed per user per UTC day
    #[serde(default = "default_everyday_limit")]
    pub everyday_limit: u32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Whether providers keep per-user conversation history
    #[serde(default)]
    pub enable_context: bool,

    #[serde(default)]
    pub chatgpt: ProviderSettings,

    #[serde(default)]
    pub wenxin: ProviderSettings,
}

impl ChatConfig {
    /// User-facing text returned once the daily limit is reached
    pub fn limit_message(&self) -> String {
        limit_message(self.everyday_limit)
    }

    /// Settings block for one provider
    pub fn provider_settings(&self, tag: ProviderTag) -> &ProviderSettings {
        match tag {
            ProviderTag::ChatGpt => &self.chatgpt,
            ProviderTag::Wenxin => &self.wenxin,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            everyday_limit: default_everyday_limit(),
            max_tokens: default_max_tokens(),
            enable_context: false,
            chatgpt: ProviderSettings::new(),
            wenxin: ProviderSettings::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_provider() -> ProviderTag {
    ProviderTag::ChatGpt
}

fn default_everyday_limit() -> u32 {
    50
}

fn default_max_tokens() -> u32 {
    3500
}

/// Load configuration from a TOML file, overlaid with `CHAT_GATEWAY__*` env vars
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("CHAT_GATEWAY").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.chat.everyday_limit == 0 {
        anyhow::bail!("everyday_limit must be greater than 0");
    }

    if cfg.chat.max_tokens == 0 {
        anyhow::bail!("max_tokens must be greater than 0");
    }

    match cfg.logging.format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid log format '{}': expected 'text' or 'json'", other),
    }

    Ok(())
}
