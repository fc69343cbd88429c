//! HTTP content source: `GET {base_url}/data/lesen.json`.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tracing::instrument;

use lesen_core::traits::ContentSource;

use crate::error::{is_permanent_error, SourceError};

pub const DEFAULT_PATH: &str = "/data/lesen.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches the content document from the site.
///
/// Unlike the browser player, a hung request ends in [`SourceError::Timeout`].
pub struct HttpSource {
    url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: &str, path: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        let path = if path.is_empty() { DEFAULT_PATH } else { path };
        let url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        Ok(Self {
            url,
            timeout_secs,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> anyhow::Result<String> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    SourceError::Network(format!("{} not reachable: {e}", self.url))
                } else {
                    SourceError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(SourceError::NotFound(self.url.clone()).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Http {
                status,
                message: body,
            }
            .into());
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(self.timeout_secs)
            } else {
                SourceError::Network(format!("failed to read response body: {e}"))
            }
        })?;
        tracing::debug!(bytes = body.len(), "content document fetched");
        Ok(body)
    }

    fn is_permanent(&self, error: &anyhow::Error) -> bool {
        is_permanent_error(error)
    }
}
