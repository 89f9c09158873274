use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Root directory chapters are downloaded under
    #[serde(default = "default_download_dir")]
    pub download_dir: String,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Locale filter applied to the chapter feed
    #[serde(default = "default_language")]
    pub language: String,

    /// Volume name for chapters the catalog leaves unassigned
    #[serde(default = "default_empty_volume_name")]
    pub empty_volume_name: String,

    /// Pause between chapter feed pages in milliseconds
    #[serde(default = "default_feed_page_delay")]
    pub feed_page_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    /// Attempts for metadata requests before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Attempts for page image downloads; larger on purpose
    #[serde(default = "default_download_retries")]
    pub download_retries: usize,

    /// Linear backoff step in milliseconds, multiplied by the attempt number
    #[serde(default = "default_retry_step")]
    pub retry_step_ms: u64,

    /// Timeout for HTTP requests in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent presented to the catalog
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_download_dir() -> String {
    ".".to_string()
}
fn default_api_url() -> String {
    crate::sources::mangadex::BASE_URL.to_string()
}
fn default_language() -> String {
    "en".to_string()
}
fn default_empty_volume_name() -> String {
    "Extras".to_string()
}
fn default_feed_page_delay() -> u64 {
    200
}
fn default_max_retries() -> usize {
    4
}
fn default_download_retries() -> usize {
    5
}
fn default_retry_step() -> u64 {
    1000
}
fn default_timeout() -> u64 {
    30
}
fn default_user_agent() -> String {
    "mangamirror/0.1.0".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            language: default_language(),
            empty_volume_name: default_empty_volume_name(),
            feed_page_delay_ms: default_feed_page_delay(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            download_retries: default_download_retries(),
            retry_step_ms: default_retry_step(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            catalog: CatalogConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let path = Path::new("config.toml");
        if path.exists() {
            if let Ok(content) = fs::read_to_string(path) {
                if let Ok(cfg) = toml::from_str::<Config>(&content) {
                    return cfg;
                }
            }
        }
        Self::default()
    }
}

impl NetworkConfig {
    /// Create an HTTP client from this configuration
    pub fn create_http_client(&self) -> crate::error::Result<crate::http_client::HttpClient> {
        use crate::http_client::{HttpClient, HttpConfig};
        use std::time::Duration;

        let config = HttpConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            download_retries: self.download_retries,
            retry_step: Duration::from_millis(self.retry_step_ms),
            user_agent: self.user_agent.clone(),
        };

        HttpClient::with_config(config)
    }
}
