use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trailer {
    /// Local row id; 0 until stored.
    pub id: i64,
    pub trailer_id: String,
    pub movie_id: i64,
    /// Site-specific video locator
    pub key: String,
    pub site: String,
    pub name: String,
}

impl Trailer {
    pub fn new(trailer_id: String, movie_id: i64) -> Self {
        Self {
            id: 0,
            trailer_id,
            movie_id,
            key: String::new(),
            site: String::new(),
            name: String::new(),
        }
    }

    /// Playable URL, when the hosting site is one we know how to link.
    pub fn watch_url(&self) -> Option<String> {
        match self.site.to_ascii_lowercase().as_str() {
            "youtube" => Some(format!("https://www.youtube.com/watch?v={}", self.key)),
            "vimeo" => Some(format!("https://vimeo.com/{}", self.key)),
            _ => None,
        }
    }
}
