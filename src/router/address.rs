use std::fmt;
use std::str::FromStr;

use crate::app::CatalogError;
use crate::domain::Category;

/// Every resource the router can serve.
///
/// ```text
/// movies                 all cached movies
/// movies/{id}            one movie
/// movies/popular         popular index, in remote order
/// movies/top_rated       top rated index, in remote order
/// movies/favorite        favorite index
/// movies/favorite/{id}   favorite membership of one movie
/// reviews                review rows (bulk write target)
/// reviews/{movieId}      reviews of one movie
/// trailers               trailer rows (bulk write target)
/// trailers/{movieId}     trailers of one movie
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceAddress {
    Movies,
    Movie(i64),
    Index(Category),
    FavoriteMovie(i64),
    Reviews,
    MovieReviews(i64),
    Trailers,
    MovieTrailers(i64),
}

impl ResourceAddress {
    /// True when `other` lies at or below this address.
    pub fn contains(&self, other: &ResourceAddress) -> bool {
        let (outer, inner) = (self.to_string(), other.to_string());
        inner == outer || inner.starts_with(&format!("{}/", outer))
    }
}

fn parse_id(address: &str, segment: &str) -> Result<i64, CatalogError> {
    match segment.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CatalogError::NotSupported(format!(
            "Unknown address: {}",
            address
        ))),
    }
}

impl FromStr for ResourceAddress {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.trim().trim_matches('/').split('/').collect();

        let address = match segments.as_slice() {
            ["movies"] => ResourceAddress::Movies,
            ["movies", "favorite", id] => ResourceAddress::FavoriteMovie(parse_id(s, id)?),
            ["movies", segment] => match Category::from_segment(segment) {
                Some(category) => ResourceAddress::Index(category),
                None => ResourceAddress::Movie(parse_id(s, segment)?),
            },
            ["reviews"] => ResourceAddress::Reviews,
            ["reviews", id] => ResourceAddress::MovieReviews(parse_id(s, id)?),
            ["trailers"] => ResourceAddress::Trailers,
            ["trailers", id] => ResourceAddress::MovieTrailers(parse_id(s, id)?),
            _ => {
                return Err(CatalogError::NotSupported(format!(
                    "Unknown address: {}",
                    s
                )))
            }
        };

        Ok(address)
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceAddress::Movies => write!(f, "movies"),
            ResourceAddress::Movie(id) => write!(f, "movies/{}", id),
            ResourceAddress::Index(category) => write!(f, "movies/{}", category.segment()),
            ResourceAddress::FavoriteMovie(id) => write!(f, "movies/favorite/{}", id),
            ResourceAddress::Reviews => write!(f, "reviews"),
            ResourceAddress::MovieReviews(id) => write!(f, "reviews/{}", id),
            ResourceAddress::Trailers => write!(f, "trailers"),
            ResourceAddress::MovieTrailers(id) => write!(f, "trailers/{}", id),
        }
    }
}
