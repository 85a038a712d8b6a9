use crate::config::SourceConfig;
use crate::domain::ports::Fetcher;
use crate::utils::error::{Result, ScrapeError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use url::Url;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Plain GET requests through one shared client. No retries.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(source: &SourceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let timeout = Duration::from_secs(source.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(CONNECT_TIMEOUT_SECS)))
            .user_agent(source.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| ScrapeError::ConfigValidationError {
                field: "source".to_string(),
                message: format!("could not build HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ScrapeError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        tracing::debug!("{} -> {}", url, status);
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| ScrapeError::Network {
            url: url.to_string(),
            source,
        })
    }
}
