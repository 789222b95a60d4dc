use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::services::http_retry::RetryPolicy;
use crate::services::ingest::Pacing;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key; ingestion and catalog search are unavailable without it
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Language sent with catalog listing requests
    #[serde(default = "default_tmdb_language")]
    pub tmdb_language: String,

    /// Prefix joined with stored poster paths
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// Location of the stored dataset
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,

    /// Default cap on the number of ingested movies
    #[serde(default = "default_max_movies")]
    pub max_movies: usize,

    /// Pause between consecutive detail lookups
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Total attempts for a request failing with connection errors or timeouts
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,

    /// Number of recommendations returned when the caller does not ask for a count
    #[serde(default = "default_recommendation_count")]
    pub recommendation_count: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("movies.csv")
}

fn default_max_movies() -> usize {
    500
}

fn default_request_delay_ms() -> u64 {
    500
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_initial_delay_ms() -> u64 {
    2000
}

fn default_recommendation_count() -> usize {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            tmdb_api_url: default_tmdb_api_url(),
            tmdb_language: default_tmdb_language(),
            image_base_url: default_image_base_url(),
            dataset_path: default_dataset_path(),
            max_movies: default_max_movies(),
            request_delay_ms: default_request_delay_ms(),
            http_timeout_secs: default_http_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
            recommendation_count: default_recommendation_count(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// The API key, if one is set and not blank
    pub fn api_key(&self) -> Option<&str> {
        self.tmdb_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts.max(1),
            initial_delay: Duration::from_millis(self.retry_initial_delay_ms),
        }
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            request_delay: Duration::from_millis(self.request_delay_ms),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
