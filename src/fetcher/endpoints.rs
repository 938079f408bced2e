use url::Url;

use crate::app::{CatalogError, Result};

const API_KEY_PARAM: &str = "api_key";

/// Builds remote catalog URLs.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
    api_key: String,
}

impl Endpoints {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(CatalogError::Config(format!(
                "Remote base URL cannot carry paths: {}",
                base_url
            )));
        }
        // Url::join replaces the last segment unless the path ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);

        Ok(Self {
            base,
            api_key: api_key.to_string(),
        })
    }

    /// One page of a category list, e.g. `movie/popular?page=1`.
    pub fn list_url(&self, endpoint: &str, page: u32) -> Result<String> {
        let mut url = self.base.join(&format!("movie/{}", endpoint))?;
        url.query_pairs_mut()
            .append_pair(API_KEY_PARAM, &self.api_key)
            .append_pair("page", &page.to_string());
        Ok(url.into())
    }

    /// Detail payload for one movie with reviews and videos embedded.
    pub fn detail_url(&self, movie_id: i64) -> Result<String> {
        let mut url = self.base.join(&format!("movie/{}", movie_id))?;
        url.query_pairs_mut()
            .append_pair("append_to_response", "reviews,videos")
            .append_pair(API_KEY_PARAM, &self.api_key);
        Ok(url.into())
    }
}

/// Strip the API credential from a URL before it reaches a log line.
pub fn redact(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| k != API_KEY_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(kept);
    }
    parsed.into()
}
