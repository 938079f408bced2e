pub mod endpoints;
pub mod http_fetcher;
#[cfg(test)]
pub mod stub;

use async_trait::async_trait;

use crate::app::Result;

pub use endpoints::Endpoints;
pub use http_fetcher::HttpFetcher;

/// Retrieves a raw response body for a URL.
///
/// Implementations report transport problems as network failures; they do not
/// interpret the payload.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
