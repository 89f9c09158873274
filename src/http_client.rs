use reqwest::{Client, ClientBuilder};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{Error, Result};

/// Configuration for the retrying HTTP client
#[derive(Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub max_retries: usize,
    pub download_retries: usize,
    pub retry_step: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 4,
            download_retries: 5,
            retry_step: Duration::from_secs(1),
            user_agent: "mangamirror/0.1.0".to_string(),
        }
    }
}

/// HTTP client with linear-backoff retry for catalog and page requests
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpConfig,
}

impl HttpClient {
    /// Create a client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: HttpConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    /// Backoff before the next try, growing linearly with the attempt number
    fn retry_delay(&self, attempt: usize) -> Duration {
        self.config.retry_step * attempt as u32
    }

    /// GET a catalog URL with query parameters. Duplicate keys in the map
    /// collapse last-write-wins before the request is built; parameter order
    /// carries no meaning.
    pub async fn get_bytes(
        &self,
        url: &str,
        params: &HashMap<String, String>,
    ) -> Result<Vec<u8>> {
        self.request_bytes(url, Some(params), self.config.max_retries)
            .await
    }

    /// GET a page image URL. Same policy as `get_bytes` with a larger
    /// attempt count.
    pub async fn download_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.request_bytes(url, None, self.config.download_retries)
            .await
    }

    async fn request_bytes(
        &self,
        url: &str,
        params: Option<&HashMap<String, String>>,
        attempts: usize,
    ) -> Result<Vec<u8>> {
        for attempt in 1..=attempts {
            let mut request = self.client.get(url);
            if let Some(params) = params {
                request = request.query(params);
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    // The request itself succeeded; a failed body read is
                    // surfaced as is rather than retried.
                    return Ok(response.bytes().await?.to_vec());
                }
                Ok(response) => {
                    log::warn!(
                        "Request to {} returned {}, attempt {}/{}",
                        url,
                        response.status(),
                        attempt,
                        attempts
                    );
                }
                Err(e) => {
                    if e.is_builder() {
                        // Malformed URL, retrying cannot help.
                        return Err(Error::Http(e));
                    }
                    log::warn!(
                        "Request to {} failed, attempt {}/{}: {}",
                        url,
                        attempt,
                        attempts,
                        e
                    );
                }
            }

            if attempt < attempts {
                sleep(self.retry_delay(attempt)).await;
            }
        }

        Err(Error::RequestFailed {
            url: url.to_string(),
            attempts,
        })
    }

    /// Politeness delay between paginated requests
    pub async fn rate_limit_delay(&self, delay_ms: u64) {
        sleep(Duration::from_millis(delay_ms)).await;
    }
}
