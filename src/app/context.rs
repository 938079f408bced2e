use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{CatalogError, Result};
use crate::config::Config;
use crate::favorites::FavoriteService;
use crate::fetcher::{Endpoints, Fetcher, HttpFetcher};
use crate::router::{ChangeNotifier, Router};
use crate::store::{SqliteStore, Store};
use crate::sync::{SyncTarget, Synchronizer};

/// Process-wide wiring: one store, one router, one synchronizer.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub router: Router,
    pub synchronizer: Arc<Synchronizer>,
    pub favorites: FavoriteService,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let db_path = match &config.store.path {
            Some(p) => p.clone(),
            None => Self::default_db_path()?,
        };
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let store = Arc::new(SqliteStore::new(&db_path)?);
        let fetcher: Arc<dyn Fetcher + Send + Sync> =
            Arc::new(HttpFetcher::with_timeout(config.request_timeout())?);
        Self::with_parts(config, store, fetcher)
    }

    pub fn with_parts(
        config: Config,
        store: Arc<SqliteStore>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
    ) -> Result<Self> {
        if config.remote.api_key.is_empty() {
            tracing::warn!("No API key configured; remote requests will likely be rejected");
        }

        let dyn_store: Arc<dyn Store> = store.clone();
        let router = Router::new(dyn_store, ChangeNotifier::default());
        let endpoints = Endpoints::new(&config.remote.base_url, &config.remote.api_key)?;
        let synchronizer =
            Synchronizer::new(fetcher, router.clone(), endpoints, SyncTarget::defaults())
                .with_detail_workers(config.sync.detail_workers)
                .with_pages(config.remote.pages);
        let favorites = FavoriteService::new(router.clone());

        Ok(Self {
            config,
            store,
            router,
            synchronizer: Arc::new(synchronizer),
            favorites,
        })
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| CatalogError::Config("Could not find data directory".into()))?;
        Ok(data_dir.join("reelcache").join("catalog.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use crate::fetcher::stub::StubFetcher;

    #[test]
    fn test_context_opens_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.store.path = Some(dir.path().join("data").join("catalog.db"));

        let ctx = AppContext::new(config).unwrap();

        assert!(dir.path().join("data").join("catalog.db").exists());
        assert!(ctx.router.movies_in(Category::Popular).unwrap().is_empty());
        assert_eq!(ctx.synchronizer.targets().len(), 2);
    }

    #[test]
    fn test_favorites_share_the_router() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let ctx =
            AppContext::with_parts(Config::default(), store, Arc::new(StubFetcher::new())).unwrap();
        let mut rx = ctx.router.subscribe();

        ctx.favorites.set_favorite(5, true).unwrap();

        assert!(rx.try_recv().is_ok());
        assert!(ctx.store.is_favorite(5).unwrap());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = Config::default();
        config.remote.base_url = "not a url".into();
        let store = Arc::new(SqliteStore::in_memory().unwrap());

        let result = AppContext::with_parts(config, store, Arc::new(StubFetcher::new()));

        assert!(matches!(result, Err(CatalogError::InvalidUrl(_))));
    }
}
