use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{CatalogError, Result};
use crate::domain::{Category, Movie, Review, Trailer};
use crate::store::Store;

const MOVIE_COLUMNS: &str =
    "m.movie_id, m.title, m.poster_path, m.overview, m.release_date, m.average_rating, m.runtime";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| CatalogError::Migration(e.to_string()))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            CatalogError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn movie_from_row(row: &Row<'_>) -> rusqlite::Result<Movie> {
        Ok(Movie {
            id: row.get(0)?,
            title: row.get(1)?,
            poster_path: row.get(2)?,
            overview: row.get(3)?,
            release_date: row.get(4)?,
            vote_average: row.get(5)?,
            runtime: row.get(6)?,
        })
    }

    fn review_from_row(row: &Row<'_>) -> rusqlite::Result<Review> {
        Ok(Review {
            id: row.get(0)?,
            review_id: row.get(1)?,
            movie_id: row.get(2)?,
            author: row.get(3)?,
            content: row.get(4)?,
            url: row.get(5)?,
        })
    }

    fn trailer_from_row(row: &Row<'_>) -> rusqlite::Result<Trailer> {
        Ok(Trailer {
            id: row.get(0)?,
            trailer_id: row.get(1)?,
            movie_id: row.get(2)?,
            key: row.get(3)?,
            site: row.get(4)?,
            name: row.get(5)?,
        })
    }

    fn index_order(category: Category) -> &'static str {
        match category {
            Category::Favorite => "idx.added_at, idx.movie_id",
            Category::Popular | Category::TopRated => "idx.position",
        }
    }
}

impl Store for SqliteStore {
    fn upsert_movies(&self, movies: &[Movie]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut applied = 0;

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO movies
                    (movie_id, title, poster_path, overview, release_date, average_rating, runtime)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(movie_id) DO UPDATE SET
                    title = excluded.title,
                    poster_path = excluded.poster_path,
                    overview = excluded.overview,
                    release_date = excluded.release_date,
                    average_rating = excluded.average_rating,
                    runtime = excluded.runtime",
            )?;

            for movie in movies {
                stmt.execute(params![
                    movie.id,
                    movie.title,
                    movie.poster_path,
                    movie.overview,
                    movie.release_date,
                    movie.vote_average,
                    movie.runtime
                ])
                .map_err(|source| CatalogError::PartialWrite {
                    table: "movies",
                    applied,
                    source,
                })?;
                applied += 1;
            }
        }

        tx.commit()?;
        Ok(applied)
    }

    fn upsert_reviews(&self, reviews: &[Review]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut applied = 0;

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO reviews (review_id, movie_id, author, review, url)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(review_id) DO UPDATE SET
                    movie_id = excluded.movie_id,
                    author = excluded.author,
                    review = excluded.review,
                    url = excluded.url",
            )?;

            for review in reviews {
                stmt.execute(params![
                    review.review_id,
                    review.movie_id,
                    review.author,
                    review.content,
                    review.url
                ])
                .map_err(|source| CatalogError::PartialWrite {
                    table: "reviews",
                    applied,
                    source,
                })?;
                applied += 1;
            }
        }

        tx.commit()?;
        Ok(applied)
    }

    fn upsert_trailers(&self, trailers: &[Trailer]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut applied = 0;

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO trailers (trailer_id, movie_id, key, site, name)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(trailer_id) DO UPDATE SET
                    movie_id = excluded.movie_id,
                    key = excluded.key,
                    site = excluded.site,
                    name = excluded.name",
            )?;

            for trailer in trailers {
                stmt.execute(params![
                    trailer.trailer_id,
                    trailer.movie_id,
                    trailer.key,
                    trailer.site,
                    trailer.name
                ])
                .map_err(|source| CatalogError::PartialWrite {
                    table: "trailers",
                    applied,
                    source,
                })?;
                applied += 1;
            }
        }

        tx.commit()?;
        Ok(applied)
    }

    fn replace_index(&self, category: Category, movie_ids: &[i64]) -> Result<usize> {
        if !category.is_replace_all() {
            return Err(CatalogError::NotSupported(format!(
                "{} index cannot be bulk replaced",
                category
            )));
        }

        // First occurrence wins; a plain INSERT below then fails on anything
        // else the table rejects.
        let mut seen = HashSet::new();
        let unique: Vec<i64> = movie_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let table = category.table();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;

        tx.execute(&format!("DELETE FROM {}", table), [])?;

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (position, movie_id) VALUES (?1, ?2)",
                table
            ))?;

            for (position, movie_id) in unique.iter().enumerate() {
                inserted += stmt
                    .execute(params![position as i64, movie_id])
                    .map_err(|source| CatalogError::PartialWrite {
                        table,
                        applied: inserted,
                        source,
                    })?;
            }
        }

        // Dropping an uncommitted transaction rolls back, so an early return
        // above leaves the previous membership in place.
        tx.commit()?;
        Ok(inserted)
    }

    fn insert_favorite(&self, movie_id: i64) -> Result<bool> {
        let conn = self.conn()?;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO favorites (movie_id, added_at) VALUES (?1, ?2)",
            params![movie_id, Utc::now().to_rfc3339()],
        )?;

        Ok(inserted > 0)
    }

    fn remove_favorite(&self, movie_id: i64) -> Result<bool> {
        let conn = self.conn()?;

        let deleted = conn.execute(
            "DELETE FROM favorites WHERE movie_id = ?1",
            params![movie_id],
        )?;

        Ok(deleted > 0)
    }

    fn is_favorite(&self, movie_id: i64) -> Result<bool> {
        let conn = self.conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM favorites WHERE movie_id = ?1",
            params![movie_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    fn read_by_index(&self, category: Category) -> Result<Vec<Movie>> {
        let conn = self.conn()?;

        // Inner join: favorites whose movie row is gone simply drop out.
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} idx
             JOIN movies m ON m.movie_id = idx.movie_id
             ORDER BY {}",
            MOVIE_COLUMNS,
            category.table(),
            Self::index_order(category)
        ))?;

        let movies = stmt
            .query_map([], Self::movie_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(movies)
    }

    fn index_ids(&self, category: Category) -> Result<Vec<i64>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT idx.movie_id FROM {} idx ORDER BY {}",
            category.table(),
            Self::index_order(category)
        ))?;

        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;

        Ok(ids)
    }

    fn read_movie(&self, id: i64) -> Result<Option<Movie>> {
        let conn = self.conn()?;

        let movie = conn
            .query_row(
                &format!("SELECT {} FROM movies m WHERE m.movie_id = ?1", MOVIE_COLUMNS),
                params![id],
                Self::movie_from_row,
            )
            .optional()?;

        Ok(movie)
    }

    fn read_all_movies(&self) -> Result<Vec<Movie>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM movies m ORDER BY m.title, m.movie_id",
            MOVIE_COLUMNS
        ))?;

        let movies = stmt
            .query_map([], Self::movie_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(movies)
    }

    fn read_reviews(&self, movie_id: i64) -> Result<Vec<Review>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, review_id, movie_id, author, review, url
             FROM reviews WHERE movie_id = ?1 ORDER BY id",
        )?;

        let reviews = stmt
            .query_map(params![movie_id], Self::review_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(reviews)
    }

    fn read_trailers(&self, movie_id: i64) -> Result<Vec<Trailer>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, trailer_id, movie_id, key, site, name
             FROM trailers WHERE movie_id = ?1 ORDER BY id",
        )?;

        let trailers = stmt
            .query_map(params![movie_id], Self::trailer_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(trailers)
    }
}
