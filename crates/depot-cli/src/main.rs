mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use depot_config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    match cli.command {
        cli::Commands::Serve { host, port } => commands::serve::handle(config, host, port).await,
        cli::Commands::List { json } => commands::list::list(&config, json).await,
        cli::Commands::Latest { platform } => commands::list::latest(&config, &platform).await,
        cli::Commands::Status { platform } => commands::list::status(&config, &platform).await,
    }
}
