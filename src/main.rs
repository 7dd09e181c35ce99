use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use chat_gateway::{config, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // A broken config file is reported by the command itself; log with defaults meanwhile
    let logging = config::load_config(&args.config)
        .map(|cfg| cfg.logging)
        .unwrap_or_default();
    init_tracing(&logging);

    match args.get_command() {
        cli::Commands::Test => {
            commands::test::execute(&args.config).await?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
        },
    }

    Ok(())
}
