use crate::app::Result;
use crate::domain::{Category, Movie};
use crate::router::{ResourceAddress, Router};

/// User-owned favorites. Never touched by sync.
#[derive(Clone)]
pub struct FavoriteService {
    router: Router,
}

impl FavoriteService {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub fn is_favorite(&self, movie_id: i64) -> Result<bool> {
        self.router.is_favorite(movie_id)
    }

    /// Make membership match `wanted`. Returns whether anything was written;
    /// asking for the current state is a no-op.
    pub fn set_favorite(&self, movie_id: i64, wanted: bool) -> Result<bool> {
        if self.router.is_favorite(movie_id)? == wanted {
            tracing::debug!("Movie {} favorite already {}", movie_id, wanted);
            return Ok(false);
        }

        let address = ResourceAddress::FavoriteMovie(movie_id);
        let changed = if wanted {
            self.router.insert(&address)?
        } else {
            self.router.delete(&address)? > 0
        };

        tracing::info!(
            "Movie {} {} favorites",
            movie_id,
            if wanted { "added to" } else { "removed from" }
        );
        Ok(changed)
    }

    /// Flip membership and return the new state.
    pub fn toggle(&self, movie_id: i64) -> Result<bool> {
        let wanted = !self.router.is_favorite(movie_id)?;
        self.set_favorite(movie_id, wanted)?;
        Ok(wanted)
    }

    /// Favorites whose movie is cached, oldest first.
    pub fn favorites(&self) -> Result<Vec<Movie>> {
        self.router.movies_in(Category::Favorite)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::sample_movie;
    use crate::router::{ChangeNotifier, Rows};
    use crate::store::{SqliteStore, Store};

    fn service() -> FavoriteService {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        FavoriteService::new(Router::new(store, ChangeNotifier::default()))
    }

    #[test]
    fn test_set_favorite_is_idempotent() {
        let favorites = service();
        let mut rx = favorites.router.subscribe();

        assert!(favorites.set_favorite(42, true).unwrap());
        assert!(!favorites.set_favorite(42, true).unwrap());

        assert!(favorites.is_favorite(42).unwrap());
        assert_eq!(
            rx.try_recv().unwrap().address,
            ResourceAddress::FavoriteMovie(42)
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unfavorite() {
        let favorites = service();
        favorites.set_favorite(42, true).unwrap();

        assert!(favorites.set_favorite(42, false).unwrap());
        assert!(!favorites.is_favorite(42).unwrap());
        assert!(!favorites.set_favorite(42, false).unwrap());
    }

    #[test]
    fn test_toggle() {
        let favorites = service();
        assert!(favorites.toggle(3).unwrap());
        assert!(!favorites.toggle(3).unwrap());
        assert!(!favorites.is_favorite(3).unwrap());
    }

    #[test]
    fn test_favorites_skip_uncached_movies() {
        let favorites = service();
        favorites
            .router
            .bulk_insert(&ResourceAddress::Movies, Rows::Movies(&[sample_movie(1)]))
            .unwrap();
        favorites.set_favorite(1, true).unwrap();
        favorites.set_favorite(99, true).unwrap();

        assert_eq!(favorites.favorites().unwrap(), vec![sample_movie(1)]);
        assert!(favorites.is_favorite(99).unwrap());
    }
}
