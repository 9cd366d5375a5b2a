//! Issue relay CLI entry point.

use anyhow::Result;
use clap::Parser;

use issue_relay::cli::{commands, handle_error, Cli, Commands};
use issue_relay::infrastructure::config::ConfigLoader;
use issue_relay::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ConfigLoader::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve(args) => {
            let _logger = LoggerImpl::init(&config.logging)?;
            commands::serve::execute(args, config).await
        }
        Commands::Migrate => {
            let _logger = LoggerImpl::init(&config.logging)?;
            commands::migrate::execute(&config, cli.json).await
        }
        Commands::Link(args) => commands::link::execute(args, &config, cli.json).await,
    }
}
