use crate::core::censor::{CensorError, ImageFetcher};
use async_trait::async_trait;
use reqwest::Client;

/// Fetches image bytes over HTTP. The client's default timeout applies;
/// the censor service turns any failure here into a pass-through.
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, CensorError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CensorError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CensorError::Fetch(format!(
                "unexpected status {} from {}",
                response.status(),
                url
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CensorError::Fetch(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
