//! # Page Fetching
//!
//! The crawl and SEO jobs read site pages through [`PageFetcher`] so that the
//! HTTP transport can be replaced in tests.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::constants::system;
use crate::error::{MaintenanceError, Result};

/// A page as returned by the server, whatever its status
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub url: String,
    pub status_code: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url`; `Err` only when no response was received
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(system::USER_AGENT)
            .build()
            .map_err(|e| {
                MaintenanceError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        debug!(url = %url, "Fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MaintenanceError::Crawl(e.to_string()))?;

        let status_code = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| MaintenanceError::Crawl(format!("failed to read body: {e}")))?;

        Ok(FetchedPage {
            url: url.to_string(),
            status_code,
            body,
        })
    }
}
