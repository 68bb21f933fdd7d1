// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.timeout())
        .build()?;
    Ok(client)
}

/// Source of remote pages.
///
/// Content services only see this trait, so they can be driven by fixtures
/// in tests. Non-success statuses are errors.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET a page as text.
    async fn get_text(&self, url: &str) -> Result<String>;

    /// GET a page as text with a per-request timeout.
    async fn get_text_with_timeout(&self, url: &str, _timeout: Duration) -> Result<String> {
        self.get_text(url).await
    }

    /// GET bypassing intermediary caches.
    async fn get_text_uncached(&self, url: &str) -> Result<String> {
        self.get_text(url).await
    }

    /// POST a JSON body and return the response text.
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String>;
}

/// [`PageFetcher`] backed by `reqwest`.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }

    /// Underlying client, for streaming downloads.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    async fn read_text(url: &str, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        Self::read_text(url, response).await
    }

    async fn get_text_with_timeout(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        Self::read_text(url, response).await
    }

    async fn get_text_uncached(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;
        Self::read_text(url, response).await
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String> {
        let response = self.client.post(url).json(body).send().await?;
        Self::read_text(url, response).await
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeFetcher;
    use super::*;

    #[test]
    fn test_create_client_from_defaults() {
        assert!(create_async_client(&HttpConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_fake_status_is_error() {
        let fetcher = FakeFetcher::new()
            .with_page("https://a.test/", "ok")
            .with_status("https://a.test/missing", 404);

        assert_eq!(fetcher.get_text("https://a.test/").await.unwrap(), "ok");
        let err = fetcher.get_text("https://a.test/missing").await.unwrap_err();
        assert!(matches!(err, AppError::Status { status: 404, .. }));
        assert!(fetcher.get_text("https://a.test/other").await.is_err());
        assert_eq!(fetcher.hits("https://a.test/missing"), 1);
    }
}
