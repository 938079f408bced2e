//! # reelcache
//!
//! An offline-first local replica of a remote movie catalog.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Parser → Router → Store
//!                      ↓
//!               ChangeNotifier → subscribers
//! ```
//!
//! Remote category lists ("popular", "top rated") are mirrored into local
//! replace-all indexes; movie details, reviews and trailers are upserted as
//! entities. Favorites are a purely local index. Reads never touch the
//! network except to fill an empty remote-backed index on first use.
//!
//! ## Quick Start
//!
//! ```bash
//! # Fetch everything now
//! reelcache sync
//!
//! # List popular movies (fetches them if the cache is empty)
//! reelcache list popular
//!
//! # Keep the cache fresh
//! reelcache daemon --interval 6h
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together store, router,
/// synchronizer and favorites.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/reelcache/config.toml`.
pub mod config;

/// Background scheduler for periodic syncs.
pub mod daemon;

/// Core domain models.
///
/// - [`Movie`](domain::Movie), [`Review`](domain::Review), [`Trailer`](domain::Trailer)
/// - [`Category`](domain::Category): the three movie indexes
pub mod domain;

/// Local-only favorite membership.
pub mod favorites;

/// Remote access.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait returning raw bodies
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`Endpoints`](fetcher::Endpoints): URL construction
pub mod fetcher;

/// Payload parsing into domain records.
pub mod parser;

/// Address-based reads and writes with change notification.
pub mod router;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): Trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// Remote-to-local synchronization.
pub mod sync;
