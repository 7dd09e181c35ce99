use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "chat-gateway",
    version,
    about = "Per-user quota and provider routing for chat completions"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true, env = "CHAT_GATEWAY_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Validate the configuration and start a chat service against it
    Test,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display the effective configuration (file + environment)
    Show,
}

impl Cli {
    /// `test` unless a subcommand was given
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Test)
    }
}
