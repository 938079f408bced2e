//! Canned-response fetcher for exercising the sync pipeline offline.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::{CatalogError, Result};
use crate::fetcher::Fetcher;

#[derive(Debug, Clone)]
enum StubResponse {
    Body(String),
    Fail(String),
}

#[derive(Default)]
pub struct StubFetcher {
    responses: Mutex<HashMap<String, StubResponse>>,
    calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.set_body(url, body);
        self
    }

    pub fn with_failure(self, url: impl Into<String>, reason: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.into(), StubResponse::Fail(reason.into()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_body(&self, url: impl Into<String>, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.into(), StubResponse::Body(body.into()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = self.responses.lock().unwrap().get(url).cloned();
        match response {
            Some(StubResponse::Body(body)) => Ok(body.into_bytes()),
            Some(StubResponse::Fail(reason)) => Err(CatalogError::Network(reason)),
            None => Err(CatalogError::Network(format!("no stub for {}", url))),
        }
    }
}
