//! Download of generated images from their temporary URLs.

use crate::error::ServiceError;
use async_trait::async_trait;

/// Fetches the bytes behind a URL.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Downloads `url`, failing on any non-success status.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ServiceError>;
}

/// [`ImageFetcher`] over plain HTTP GET.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a default client.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::from_status(status.as_u16(), &text));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
