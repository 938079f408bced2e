pub mod sqlite;

use crate::app::Result;
use crate::domain::{Category, Movie, Review, Trailer};

pub use sqlite::SqliteStore;

/// Durable catalog replica.
///
/// Every bulk write runs in a single transaction: either all rows land or
/// none do. Readers observe an index either before or after a replacement,
/// never half way through.
pub trait Store: Send + Sync {
    // Entity writes (last write wins on the remote id)
    fn upsert_movies(&self, movies: &[Movie]) -> Result<usize>;
    fn upsert_reviews(&self, reviews: &[Review]) -> Result<usize>;
    fn upsert_trailers(&self, trailers: &[Trailer]) -> Result<usize>;

    // Index writes
    fn replace_index(&self, category: Category, movie_ids: &[i64]) -> Result<usize>;
    fn insert_favorite(&self, movie_id: i64) -> Result<bool>;
    fn remove_favorite(&self, movie_id: i64) -> Result<bool>;

    // Reads
    fn is_favorite(&self, movie_id: i64) -> Result<bool>;
    fn read_by_index(&self, category: Category) -> Result<Vec<Movie>>;
    fn index_ids(&self, category: Category) -> Result<Vec<i64>>;
    fn read_movie(&self, id: i64) -> Result<Option<Movie>>;
    fn read_all_movies(&self) -> Result<Vec<Movie>>;
    fn read_reviews(&self, movie_id: i64) -> Result<Vec<Review>>;
    fn read_trailers(&self, movie_id: i64) -> Result<Vec<Trailer>>;
}
