use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::app::{CatalogError, Result};
use crate::fetcher::endpoints::redact;
use crate::fetcher::Fetcher;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("reelcache/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

/// The remote reports API-level rejections (bad key, unknown id) as a JSON
/// body with a `status_code`, usually alongside a 4xx status.
fn carries_status_code(body: &[u8]) -> bool {
    serde_json::from_slice::<serde_json::Value>(body)
        .map(|value| value.get("status_code").is_some())
        .unwrap_or(false)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await.map_err(|e| {
            CatalogError::Network(format!("GET {} failed: {}", redact(url), e.without_url()))
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                CatalogError::Network(format!(
                    "reading {} failed: {}",
                    redact(url),
                    e.without_url()
                ))
            })?
            .to_vec();

        if status.is_success() || carries_status_code(&body) {
            tracing::debug!("GET {} -> {} ({} bytes)", redact(url), status, body.len());
            return Ok(body);
        }

        Err(CatalogError::Network(format!(
            "GET {} returned HTTP {}",
            redact(url),
            status
        )))
    }
}
