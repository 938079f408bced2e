//! Resource-addressed access to the catalog.
//!
//! The router owns no data. It maps a [`ResourceAddress`] onto one [`Store`]
//! operation and, after any write that changed rows, tells the
//! [`ChangeNotifier`] which address was touched.

pub mod address;
pub mod notifier;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::app::{CatalogError, Result};
use crate::domain::{Category, Movie, Review, Trailer};
use crate::store::Store;

pub use address::ResourceAddress;
pub use notifier::{ChangeEvent, ChangeNotifier};

/// Result of a read, shaped by the address that was queried.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Movies(Vec<Movie>),
    Movie(Option<Movie>),
    Reviews(Vec<Review>),
    Trailers(Vec<Trailer>),
    Membership(bool),
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        match self {
            QueryResult::Movies(movies) => movies.is_empty(),
            QueryResult::Movie(movie) => movie.is_none(),
            QueryResult::Reviews(reviews) => reviews.is_empty(),
            QueryResult::Trailers(trailers) => trailers.is_empty(),
            QueryResult::Membership(member) => !member,
        }
    }

    pub fn into_movie(self) -> Option<Movie> {
        match self {
            QueryResult::Movie(movie) => movie,
            _ => None,
        }
    }
}

/// Rows for a bulk upsert.
#[derive(Debug, Clone, Copy)]
pub enum Rows<'a> {
    Movies(&'a [Movie]),
    Reviews(&'a [Review]),
    Trailers(&'a [Trailer]),
}

impl Rows<'_> {
    fn address(&self) -> ResourceAddress {
        match self {
            Rows::Movies(_) => ResourceAddress::Movies,
            Rows::Reviews(_) => ResourceAddress::Reviews,
            Rows::Trailers(_) => ResourceAddress::Trailers,
        }
    }
}

#[derive(Clone)]
pub struct Router {
    store: Arc<dyn Store>,
    notifier: ChangeNotifier,
}

impl Router {
    pub fn new(store: Arc<dyn Store>, notifier: ChangeNotifier) -> Self {
        Self { store, notifier }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.notifier.subscribe()
    }

    pub fn query_path(&self, path: &str) -> Result<QueryResult> {
        self.query(&path.parse()?)
    }

    pub fn query(&self, address: &ResourceAddress) -> Result<QueryResult> {
        let result = match *address {
            ResourceAddress::Movies => QueryResult::Movies(self.store.read_all_movies()?),
            ResourceAddress::Movie(id) => QueryResult::Movie(self.store.read_movie(id)?),
            ResourceAddress::Index(category) => {
                QueryResult::Movies(self.store.read_by_index(category)?)
            }
            ResourceAddress::FavoriteMovie(id) => {
                QueryResult::Membership(self.store.is_favorite(id)?)
            }
            ResourceAddress::MovieReviews(id) => {
                QueryResult::Reviews(self.store.read_reviews(id)?)
            }
            ResourceAddress::MovieTrailers(id) => {
                QueryResult::Trailers(self.store.read_trailers(id)?)
            }
            ResourceAddress::Reviews | ResourceAddress::Trailers => {
                return Err(unsupported("query", address))
            }
        };

        Ok(result)
    }

    /// Movies of one index, in index order.
    pub fn movies_in(&self, category: Category) -> Result<Vec<Movie>> {
        self.store.read_by_index(category)
    }

    pub fn is_favorite(&self, movie_id: i64) -> Result<bool> {
        self.store.is_favorite(movie_id)
    }

    /// Upsert entity rows at `movies`, `reviews` or `trailers`.
    pub fn bulk_insert(&self, address: &ResourceAddress, rows: Rows<'_>) -> Result<usize> {
        if rows.address() != *address {
            return Err(unsupported("bulk insert", address));
        }

        let count = match rows {
            Rows::Movies(movies) => self.store.upsert_movies(movies)?,
            Rows::Reviews(reviews) => self.store.upsert_reviews(reviews)?,
            Rows::Trailers(trailers) => self.store.upsert_trailers(trailers)?,
        };

        if count > 0 {
            self.notifier.notify(*address);
        }
        Ok(count)
    }

    /// Swap the whole membership of a replace-all index.
    pub fn replace(&self, address: &ResourceAddress, movie_ids: &[i64]) -> Result<usize> {
        let ResourceAddress::Index(category) = *address else {
            return Err(unsupported("replace", address));
        };

        let count = self.store.replace_index(category, movie_ids)?;
        self.notifier.notify(*address);
        Ok(count)
    }

    /// Add one favorite at `movies/favorite/{id}`. Returns whether a row was
    /// added.
    pub fn insert(&self, address: &ResourceAddress) -> Result<bool> {
        let ResourceAddress::FavoriteMovie(movie_id) = *address else {
            return Err(unsupported("insert", address));
        };

        let inserted = self.store.insert_favorite(movie_id)?;
        if inserted {
            self.notifier.notify(*address);
        }
        Ok(inserted)
    }

    /// Remove a favorite, or clear a replace-all index. Returns rows removed.
    pub fn delete(&self, address: &ResourceAddress) -> Result<usize> {
        match *address {
            ResourceAddress::FavoriteMovie(movie_id) => {
                let removed = self.store.remove_favorite(movie_id)?;
                if removed {
                    self.notifier.notify(*address);
                }
                Ok(usize::from(removed))
            }
            ResourceAddress::Index(category) if category.is_replace_all() => {
                let removed = self.store.index_ids(category)?.len();
                self.store.replace_index(category, &[])?;
                self.notifier.notify(*address);
                Ok(removed)
            }
            _ => Err(unsupported("delete", address)),
        }
    }
}

fn unsupported(operation: &str, address: &ResourceAddress) -> CatalogError {
    CatalogError::NotSupported(format!("{} at {}", operation, address))
}
