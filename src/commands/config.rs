use anyhow::Result;
use chat_gateway::config::{self, Config, ProviderSettings};
use colored::Colorize;
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the effective configuration with secrets masked
pub fn show(path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!(path = %path.display(), "Loading configuration for display");

    let cfg = config::load_config(path)?;
    let sanitized = sanitize_secrets(&cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(&sanitized)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Mask anything that looks like a credential in the provider blocks
fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();
    mask_settings(&mut sanitized.chat.chatgpt);
    mask_settings(&mut sanitized.chat.wenxin);
    sanitized
}

fn mask_settings(settings: &mut ProviderSettings) {
    for (key, value) in settings.iter_mut() {
        if !is_secret_key(key) {
            continue;
        }
        if let Some(secret) = value.as_str() {
            *value = serde_json::Value::String(mask_api_key(secret));
        }
    }
}

fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.contains("key") || key.contains("secret") || key.contains("token")
}

/// Mask a credential for display, keeping the first 7 and last 4 characters
///
/// "sk-1234567890abcdef" -> "sk-1234...cdef"; 11 characters or fewer become "***"
fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }

    let prefix: String = chars[..7].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();

    format!("{}...{}", prefix, suffix)
}
