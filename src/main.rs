use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reelcache::app::AppContext;
use reelcache::cli::{commands, Cli, Commands};
use reelcache::config::{Config, API_KEY_ENV};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            Config::load_from(path)?.with_api_key_override(std::env::var(API_KEY_ENV).ok())
        }
        None => Config::load()?,
    };
    if let Some(db) = cli.db {
        config.store.path = Some(db);
    }

    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Sync { target } => {
            commands::sync(&ctx, target.as_deref()).await?;
        }
        Commands::List { category } => {
            commands::list(&ctx, &category).await?;
        }
        Commands::Show { id } => {
            commands::show(&ctx, id)?;
        }
        Commands::Favorite { id } => {
            commands::set_favorite(&ctx, id, true)?;
        }
        Commands::Unfavorite { id } => {
            commands::set_favorite(&ctx, id, false)?;
        }
        Commands::Query { address } => {
            commands::query(&ctx, &address)?;
        }
        Commands::Daemon {
            interval,
            no_initial_update,
        } => {
            commands::daemon(&ctx, interval.as_deref(), no_initial_update).await?;
        }
    }

    Ok(())
}
