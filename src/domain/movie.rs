use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::{Review, Trailer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Remote identifier, stable across syncs.
    pub id: i64,
    pub title: String,
    /// Relative poster path, e.g. `/nBNZadXqJSdt05SHLqgT0HuC5Gm.jpg`
    pub poster_path: String,
    pub overview: String,
    /// Release date as epoch milliseconds at midnight UTC
    pub release_date: i64,
    /// Average rating out of ten
    pub vote_average: f64,
    /// Runtime in minutes
    pub runtime: i64,
}

impl Movie {
    pub fn release_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.release_date)
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_datetime().map(|dt| dt.year())
    }

    /// Absolute poster URL under the given image base.
    pub fn poster_url(&self, image_base: &str) -> String {
        format!(
            "{}/{}",
            image_base.trim_end_matches('/'),
            self.poster_path.trim_start_matches('/')
        )
    }
}

/// Everything one detail payload yields.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetail {
    pub movie: Movie,
    pub reviews: Vec<Review>,
    pub trailers: Vec<Trailer>,
}

#[cfg(test)]
pub(crate) fn sample_movie(id: i64) -> Movie {
    Movie {
        id,
        title: format!("Movie {}", id),
        poster_path: format!("/poster-{}.jpg", id),
        overview: "An overview".into(),
        release_date: 1_704_067_200_000,
        vote_average: 7.5,
        runtime: 120,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_year() {
        let movie = sample_movie(1);
        assert_eq!(movie.release_year(), Some(2024));
    }

    #[test]
    fn test_poster_url_joins_single_slash() {
        let movie = sample_movie(7);
        assert_eq!(
            movie.poster_url("https://image.tmdb.org/t/p/w185/"),
            "https://image.tmdb.org/t/p/w185/poster-7.jpg"
        );
        assert_eq!(
            movie.poster_url("https://image.tmdb.org/t/p/w185"),
            "https://image.tmdb.org/t/p/w185/poster-7.jpg"
        );
    }
}
