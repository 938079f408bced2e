use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Local row id; 0 until stored.
    pub id: i64,
    pub review_id: String,
    pub movie_id: i64,
    pub author: String,
    pub content: String,
    pub url: String,
}

impl Review {
    pub fn new(review_id: String, movie_id: i64) -> Self {
        Self {
            id: 0,
            review_id,
            movie_id,
            author: String::new(),
            content: String::new(),
            url: String::new(),
        }
    }
}
