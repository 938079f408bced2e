use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::app::CatalogError;

/// One view of the catalog backed by an index table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Popular,
    TopRated,
    Favorite,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Popular, Category::TopRated, Category::Favorite];

    /// Index table holding this category's membership.
    pub fn table(self) -> &'static str {
        match self {
            Category::Popular => "popular",
            Category::TopRated => "top_rated",
            Category::Favorite => "favorites",
        }
    }

    /// Path segment under `movies/` in a resource address.
    pub fn segment(self) -> &'static str {
        match self {
            Category::Popular => "popular",
            Category::TopRated => "top_rated",
            Category::Favorite => "favorite",
        }
    }

    /// Popular and TopRated are swapped wholesale on every sync; Favorite is
    /// only ever mutated one id at a time.
    pub fn is_replace_all(self) -> bool {
        !matches!(self, Category::Favorite)
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.segment() == segment)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "popular" => Ok(Category::Popular),
            "top_rated" | "toprated" => Ok(Category::TopRated),
            "favorite" | "favorites" => Ok(Category::Favorite),
            _ => Err(CatalogError::NotSupported(format!("Unknown category: {}", s))),
        }
    }
}
