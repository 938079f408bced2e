//! Turns raw remote payloads into domain records.
//!
//! Two payload shapes are understood: a category list page
//! (`{results: [{id, ..}], status_code?}`) and a movie detail with reviews and
//! videos embedded. Parsing is pure; the caller decides what a failure means
//! for the rest of the sync.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::app::{CatalogError, Result};
use crate::domain::{Movie, MovieDetail, Review, Trailer};

/// Release dates arrive as calendar dates.
pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

/// `status_code` values that mean the request was served normally.
const SUCCESS_STATUS_CODES: [i64; 2] = [1, 200];

#[derive(Debug, Deserialize)]
struct ListPage {
    results: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct RawMovie {
    id: Option<i64>,
    title: Option<String>,
    original_title: Option<String>,
    poster_path: Option<String>,
    overview: Option<String>,
    release_date: Option<String>,
    vote_average: Option<f64>,
    runtime: Option<i64>,
    // Kept untyped so one bad entry cannot sink the movie
    #[serde(default)]
    reviews: Value,
    #[serde(default)]
    videos: Value,
}

#[derive(Debug, Deserialize)]
struct RawReview {
    id: String,
    author: String,
    content: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RawVideo {
    id: String,
    key: String,
    site: String,
    name: String,
}

/// Entries of an embedded `{results: [..]}` list that convert cleanly. The
/// rest are logged and dropped.
fn embedded<T: DeserializeOwned>(container: &Value, what: &str, movie_id: i64) -> Vec<T> {
    let Some(results) = container.get("results").and_then(Value::as_array) else {
        return Vec::new();
    };

    results
        .iter()
        .enumerate()
        .filter_map(|(position, entry)| match T::deserialize(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(
                    "Skipping {} {} of movie {}: {}",
                    what,
                    position,
                    movie_id,
                    e
                );
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct CatalogParser;

impl CatalogParser {
    pub fn new() -> Self {
        Self
    }

    /// Ordered movie ids from one list page. Entries without a usable id are
    /// skipped.
    pub fn parse_id_list(&self, body: &[u8]) -> Result<Vec<i64>> {
        let value = Self::validated(body)?;
        let page: ListPage = serde_json::from_value(value)?;

        let entries = page
            .results
            .ok_or_else(|| CatalogError::MalformedRecord("list has no results".into()))?;

        let ids = entries
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| match ListEntry::deserialize(entry) {
                Ok(ListEntry { id }) if id > 0 => Some(id),
                _ => {
                    tracing::warn!("Skipping list entry {} without a valid id", position);
                    None
                }
            })
            .collect();

        Ok(ids)
    }

    /// One movie plus whatever reviews and trailers came embedded with it.
    ///
    /// A missing required movie field fails the whole record; a broken review
    /// or trailer is dropped on its own.
    pub fn parse_detail(&self, body: &[u8]) -> Result<MovieDetail> {
        let value = Self::validated(body)?;
        let raw: RawMovie = serde_json::from_value(value)?;

        let id = raw
            .id
            .filter(|id| *id > 0)
            .ok_or_else(|| CatalogError::MalformedRecord("movie has no id".into()))?;
        let missing =
            |field: &str| CatalogError::MalformedRecord(format!("movie {} has no {}", id, field));

        let release_text = raw.release_date.ok_or_else(|| missing("release_date"))?;
        let release_date = parse_release_date(&release_text).ok_or_else(|| {
            CatalogError::MalformedRecord(format!(
                "movie {} has unparseable release_date {:?}",
                id, release_text
            ))
        })?;

        let movie = Movie {
            id,
            title: raw
                .title
                .or(raw.original_title)
                .ok_or_else(|| missing("title"))?,
            poster_path: raw.poster_path.ok_or_else(|| missing("poster_path"))?,
            overview: raw.overview.ok_or_else(|| missing("overview"))?,
            release_date,
            vote_average: raw.vote_average.ok_or_else(|| missing("vote_average"))?,
            runtime: raw.runtime.ok_or_else(|| missing("runtime"))?,
        };

        let reviews = embedded::<RawReview>(&raw.reviews, "review", id)
            .into_iter()
            .map(|r| Review {
                author: r.author,
                content: r.content,
                url: r.url,
                ..Review::new(r.id, id)
            })
            .collect();

        let trailers = embedded::<RawVideo>(&raw.videos, "trailer", id)
            .into_iter()
            .map(|v| Trailer {
                key: v.key,
                site: v.site,
                name: v.name,
                ..Trailer::new(v.id, id)
            })
            .collect();

        Ok(MovieDetail {
            movie,
            reviews,
            trailers,
        })
    }

    /// Parse JSON and reject payloads whose `status_code` is not a success.
    fn validated(body: &[u8]) -> Result<Value> {
        let value: Value = serde_json::from_slice(body)?;

        if !value.is_object() {
            return Err(CatalogError::MalformedRecord(
                "payload is not a JSON object".into(),
            ));
        }

        if let Some(code) = value.get("status_code") {
            let status_code = code.as_i64().unwrap_or(-1);
            if !SUCCESS_STATUS_CODES.contains(&status_code) {
                return Err(CatalogError::RemoteRejected {
                    status_code,
                    message: value
                        .get("status_message")
                        .and_then(Value::as_str)
                        .map(String::from),
                });
            }
        }

        Ok(value)
    }
}

/// Epoch milliseconds at midnight UTC for a `YYYY-MM-DD` date.
pub fn parse_release_date(text: &str) -> Option<i64> {
    NaiveDate::parse_from_str(text.trim(), RELEASE_DATE_FORMAT)
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
}

#[cfg(test)]
pub(crate) fn detail_json(id: i64) -> String {
    serde_json::json!({
        "id": id,
        "title": format!("Movie {}", id),
        "poster_path": format!("/poster-{}.jpg", id),
        "overview": "An overview",
        "release_date": "2024-01-01",
        "vote_average": 7.5,
        "runtime": 120,
        "reviews": {
            "page": 1,
            "results": [
                {
                    "id": format!("review-{}", id),
                    "author": "critic",
                    "content": "Loved it",
                    "url": format!("https://example.com/review-{}", id)
                }
            ]
        },
        "videos": {
            "results": [
                {
                    "id": format!("video-{}", id),
                    "key": format!("yt{}", id),
                    "site": "YouTube",
                    "name": "Official Trailer"
                }
            ]
        }
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ErrorKind;
    use crate::domain::sample_movie;

    fn without(field: &str, id: i64) -> String {
        let mut value: Value = serde_json::from_str(&detail_json(id)).unwrap();
        value.as_object_mut().unwrap().remove(field);
        value.to_string()
    }

    #[test]
    fn test_parse_id_list_preserves_order() {
        let body = br#"{"page":1,"results":[{"id":2,"title":"b"},{"id":1},{"id":3}]}"#;
        let ids = CatalogParser::new().parse_id_list(body).unwrap();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_parse_id_list_skips_entries_without_id() {
        let body = br#"{"results":[{"id":1},{"title":"no id"},{"id":-4},{"id":2}]}"#;
        let ids = CatalogParser::new().parse_id_list(body).unwrap();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_parse_id_list_skips_wrongly_typed_ids() {
        let body = br#"{"results":[{"id":1},{"id":"abc"},"junk",{"id":2.5},{"id":2}]}"#;
        let ids = CatalogParser::new().parse_id_list(body).unwrap();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_parse_id_list_requires_results() {
        let err = CatalogParser::new().parse_id_list(br#"{"page":1}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRecord);
    }

    #[test]
    fn test_success_status_code_proceeds() {
        let body = br#"{"status_code":200,"results":[{"id":9}]}"#;
        assert_eq!(CatalogParser::new().parse_id_list(body).unwrap(), vec![9]);
    }

    #[test]
    fn test_not_found_status_is_rejected() {
        let body = br#"{"status_code":34,"status_message":"The resource could not be found."}"#;
        let err = CatalogParser::new().parse_detail(body).unwrap_err();
        match err {
            CatalogError::RemoteRejected {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 34);
                assert!(message.unwrap().contains("could not be found"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_other_status_is_rejected() {
        let body = br#"{"status_code":7,"status_message":"Invalid API key","results":[]}"#;
        let err = CatalogParser::new().parse_id_list(body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteRejected);
    }

    #[test]
    fn test_parse_detail_full() {
        let detail = CatalogParser::new()
            .parse_detail(detail_json(5).as_bytes())
            .unwrap();

        assert_eq!(detail.movie, sample_movie(5));
        assert_eq!(detail.reviews.len(), 1);
        assert_eq!(detail.reviews[0].review_id, "review-5");
        assert_eq!(detail.reviews[0].movie_id, 5);
        assert_eq!(detail.trailers.len(), 1);
        assert_eq!(detail.trailers[0].key, "yt5");
        assert_eq!(detail.trailers[0].movie_id, 5);
    }

    #[test]
    fn test_missing_overview_is_malformed() {
        let err = CatalogParser::new()
            .parse_detail(without("overview", 3).as_bytes())
            .unwrap_err();
        assert!(matches!(err, CatalogError::MalformedRecord(ref m) if m.contains("overview")));
    }

    #[test]
    fn test_each_required_field_is_enforced() {
        for field in ["id", "poster_path", "release_date", "vote_average", "runtime"] {
            let err = CatalogParser::new()
                .parse_detail(without(field, 3).as_bytes())
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedRecord, "field {}", field);
        }
    }

    #[test]
    fn test_null_runtime_is_malformed() {
        let mut value: Value = serde_json::from_str(&detail_json(3)).unwrap();
        value["runtime"] = Value::Null;
        let err = CatalogParser::new()
            .parse_detail(value.to_string().as_bytes())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRecord);
    }

    #[test]
    fn test_title_falls_back_to_original_title() {
        let mut value: Value = serde_json::from_str(&without("title", 3)).unwrap();
        value["original_title"] = Value::from("Le Film");
        let detail = CatalogParser::new()
            .parse_detail(value.to_string().as_bytes())
            .unwrap();
        assert_eq!(detail.movie.title, "Le Film");
    }

    #[test]
    fn test_unparseable_release_date_is_malformed() {
        let mut value: Value = serde_json::from_str(&detail_json(3)).unwrap();
        value["release_date"] = Value::from("");
        let err = CatalogParser::new()
            .parse_detail(value.to_string().as_bytes())
            .unwrap_err();
        assert!(matches!(err, CatalogError::MalformedRecord(ref m) if m.contains("release_date")));
    }

    #[test]
    fn test_incomplete_review_is_skipped() {
        let mut value: Value = serde_json::from_str(&detail_json(3)).unwrap();
        value["reviews"]["results"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!({"id": "r-broken", "author": "anon"}));
        let detail = CatalogParser::new()
            .parse_detail(value.to_string().as_bytes())
            .unwrap();
        assert_eq!(detail.reviews.len(), 1);
        assert_eq!(detail.movie.id, 3);
    }

    #[test]
    fn test_wrongly_typed_review_and_trailer_are_skipped() {
        let mut value: Value = serde_json::from_str(&detail_json(3)).unwrap();
        value["reviews"]["results"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!({"id": "r-2", "author": "anon", "content": "ok", "url": 5}));
        value["videos"]["results"]
            .as_array_mut()
            .unwrap()
            .insert(0, serde_json::json!({"id": 17, "key": "k", "site": "YouTube", "name": "n"}));

        let detail = CatalogParser::new()
            .parse_detail(value.to_string().as_bytes())
            .unwrap();

        assert_eq!(detail.movie, sample_movie(3));
        assert_eq!(detail.reviews.len(), 1);
        assert_eq!(detail.reviews[0].review_id, "review-3");
        assert_eq!(detail.trailers.len(), 1);
        assert_eq!(detail.trailers[0].trailer_id, "video-3");
    }

    #[test]
    fn test_embedded_lists_of_the_wrong_shape_are_ignored() {
        let mut value: Value = serde_json::from_str(&detail_json(3)).unwrap();
        value["reviews"] = Value::from("unavailable");
        value["videos"] = serde_json::json!({"results": null});

        let detail = CatalogParser::new()
            .parse_detail(value.to_string().as_bytes())
            .unwrap();

        assert_eq!(detail.movie.id, 3);
        assert!(detail.reviews.is_empty());
        assert!(detail.trailers.is_empty());
    }

    #[test]
    fn test_detail_without_embedded_lists() {
        let body = without("reviews", 4);
        let mut value: Value = serde_json::from_str(&body).unwrap();
        value.as_object_mut().unwrap().remove("videos");
        let detail = CatalogParser::new()
            .parse_detail(value.to_string().as_bytes())
            .unwrap();
        assert!(detail.reviews.is_empty());
        assert!(detail.trailers.is_empty());
    }

    #[test]
    fn test_non_json_payload() {
        let err = CatalogParser::new().parse_detail(b"<html>oops</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRecord);

        let err = CatalogParser::new().parse_id_list(b"[1,2,3]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRecord);
    }

    #[test]
    fn test_parse_release_date_midnight_utc() {
        assert_eq!(parse_release_date("2024-01-01"), Some(1_704_067_200_000));
        assert_eq!(parse_release_date("1970-01-01"), Some(0));
        assert_eq!(parse_release_date("01/02/2024"), None);
    }
}
