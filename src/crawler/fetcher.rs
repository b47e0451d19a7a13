//! HTTP fetcher implementation
//!
//! This module defines the page fetcher capability and its plain-HTTP
//! implementation:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests for listing pages
//! - Error classification into a tagged result instead of a propagated error

use crate::config::FetcherConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// Page body content
        body: String,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// The response carried no content
    EmptyBody,

    /// Network error (connection refused, timeout, browser session failure)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl fmt::Display for FetchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { final_url, body } => {
                write!(f, "{} bytes from {}", body.len(), final_url)
            }
            Self::HttpError { status_code } => write!(f, "HTTP {}", status_code),
            Self::EmptyBody => write!(f, "empty response body"),
            Self::NetworkError { error } => write!(f, "{}", error),
        }
    }
}

/// Retrieves raw HTML for a URL
///
/// Implementations never return an error: every failure is folded into a
/// [`FetchResult`] variant, and any session opened for the request is
/// released before `fetch` returns.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Short implementation name for log lines
    fn name(&self) -> &'static str;

    async fn fetch(&self, url: &str) -> FetchResult;

    /// Releases long-lived resources at the end of a crawl
    async fn close(&self) {}
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use jobs_harvest::config::FetcherConfig;
/// use jobs_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.navigation_timeout())
        .connect_timeout(Duration::from_secs(10).min(config.navigation_timeout()))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with non-blank body | Success |
/// | 2xx with blank body | EmptyBody |
/// | any other status | HttpError |
/// | timeout | NetworkError |
/// | connection refused / DNS / TLS | NetworkError |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            if !status.is_success() {
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) if body.trim().is_empty() => FetchResult::EmptyBody,
                Ok(body) => FetchResult::Success { final_url, body },
                Err(e) => FetchResult::NetworkError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => {
            if e.is_timeout() {
                FetchResult::NetworkError {
                    error: "Request timeout".to_string(),
                }
            } else if e.is_connect() {
                FetchResult::NetworkError {
                    error: "Connection refused".to_string(),
                }
            } else {
                FetchResult::NetworkError {
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Plain-HTTP page fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, url: &str) -> FetchResult {
        fetch_url(&self.client, url).await
    }
}
