pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "reelcache")]
#[command(about = "An offline cache of a remote movie catalog", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/reelcache/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Database file, overriding the config
    #[arg(long, global = true)]
    pub db: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refresh remote categories now
    Sync {
        /// Category to sync (popular, top_rated); all when omitted
        target: Option<String>,
    },
    /// List the movies of a category, fetching it first if empty
    List {
        /// popular, top_rated or favorite
        category: String,
    },
    /// Show a cached movie with its reviews and trailers
    Show {
        /// Movie id
        id: i64,
    },
    /// Mark a movie as favorite
    Favorite {
        /// Movie id
        id: i64,
    },
    /// Remove a movie from favorites
    Unfavorite {
        /// Movie id
        id: i64,
    },
    /// Read any address (e.g. "movies/popular", "reviews/550") as JSON
    Query {
        address: String,
    },
    /// Keep the cache fresh in the foreground until interrupted
    Daemon {
        /// Sync interval for every category (e.g., "6h", "1d")
        #[arg(short, long)]
        interval: Option<String>,

        /// Skip initial sync on start
        #[arg(long)]
        no_initial_update: bool,
    },
}
