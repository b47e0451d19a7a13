//! Headless-browser page fetcher
//!
//! Drives a WebDriver endpoint (chromedriver, Selenium) for sites that only
//! render their listing with JavaScript. A fresh session is opened for every
//! fetch and quit before `fetch` returns, so concurrent page tasks never
//! share browser state.

use crate::config::FetcherConfig;
use crate::crawler::fetcher::{FetchResult, PageFetcher};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use thirtyfour::prelude::*;
use tracing::{debug, warn};

/// WebDriver-backed page fetcher
pub struct BrowserFetcher {
    webdriver_url: String,
    user_agent: String,
    headless: bool,
    navigation_timeout: Duration,
}

impl BrowserFetcher {
    pub fn new(config: &FetcherConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            user_agent: config.user_agent.clone(),
            headless: config.headless,
            navigation_timeout: config.navigation_timeout(),
        }
    }

    async fn open_session(&self) -> Result<WebDriver> {
        let mut caps = DesiredCapabilities::chrome();

        if self.headless {
            caps.set_headless()?;
        }
        caps.add_chrome_arg(&format!("--user-agent={}", self.user_agent))?;
        caps.add_chrome_arg("--disable-dev-shm-usage")?;

        let driver = WebDriver::new(&self.webdriver_url, caps)
            .await
            .context("Failed to connect to WebDriver")?;

        Ok(driver)
    }

    /// Navigates and returns (final URL, page source)
    async fn load(&self, driver: &WebDriver, url: &str) -> Result<(String, String)> {
        driver
            .set_page_load_timeout(self.navigation_timeout)
            .await
            .context("Failed to set page load timeout")?;

        driver
            .goto(url)
            .await
            .with_context(|| format!("Failed to navigate to URL: {}", url))?;

        let source = driver.source().await.context("Failed to get page source")?;
        let final_url = driver
            .current_url()
            .await
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string());

        Ok((final_url, source))
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn fetch(&self, url: &str) -> FetchResult {
        let driver = match self.open_session().await {
            Ok(driver) => driver,
            Err(e) => {
                return FetchResult::NetworkError {
                    error: format!("{:#}", e),
                }
            }
        };

        // The WebDriver timeout only covers navigation; this bounds the
        // whole exchange including the source download.
        let loaded = tokio::time::timeout(self.navigation_timeout, self.load(&driver, url)).await;

        if let Err(e) = driver.quit().await {
            warn!("Error closing browser session: {}", e);
        } else {
            debug!("Browser session closed");
        }

        match loaded {
            Ok(Ok((_, body))) if body.trim().is_empty() => FetchResult::EmptyBody,
            Ok(Ok((final_url, body))) => FetchResult::Success { final_url, body },
            Ok(Err(e)) => FetchResult::NetworkError {
                error: format!("{:#}", e),
            },
            Err(_) => FetchResult::NetworkError {
                error: format!(
                    "Navigation timed out after {}s",
                    self.navigation_timeout.as_secs()
                ),
            },
        }
    }
}
