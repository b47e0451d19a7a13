//! Crawler module for listing pagination and record extraction
//!
//! This module contains the core crawling logic, including:
//! - Page fetching over plain HTTP or a WebDriver browser session
//! - Listing table extraction into job records
//! - Sequential and bounded-concurrent pagination
//! - Overall crawl coordination

mod browser;
mod controller;
mod extractor;
mod fetcher;
mod listing;

pub use browser::BrowserFetcher;
pub use controller::{CrawlController, CrawlSettings, PageResult};
pub use extractor::{Extraction, RecordExtractor, TableExtractor};
pub use fetcher::{build_http_client, fetch_url, FetchResult, HttpFetcher, PageFetcher};
pub use listing::{listing_url, page_number_of};

use crate::config::{Config, FetcherBackend, FetcherConfig};
use crate::output::stats::CrawlReport;
use crate::storage::open_store_or_unavailable;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Pagination policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CrawlMode {
    /// Walk pages one at a time until a stop condition fires
    #[default]
    Sequential,

    /// Fetch a fixed page range in parallel, then insert in bulk
    Concurrent,
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Concurrent => write!(f, "concurrent"),
        }
    }
}

/// Builds the page fetcher selected by `config`
pub fn build_fetcher(config: &FetcherConfig) -> Result<Arc<dyn PageFetcher>, crate::HarvestError> {
    match config.backend {
        FetcherBackend::Http => Ok(Arc::new(HttpFetcher::new(config)?)),
        FetcherBackend::Browser => Ok(Arc::new(BrowserFetcher::new(config))),
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the configured store (or degrade to an unavailable one)
/// 2. Build the page fetcher and the table extractor
/// 3. Seed, page, drain and close through a [`CrawlController`]
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl ran to completion
/// * `Err(HarvestError)` - The fetcher or the base URL could not be set up
pub async fn crawl(config: &Config) -> Result<CrawlReport, crate::HarvestError> {
    let settings = CrawlSettings::from_config(config)?;
    let fetcher = build_fetcher(&config.fetcher)?;
    let extractor = Arc::new(TableExtractor::from_site(&config.site));
    let store = open_store_or_unavailable(&config.database).await;

    let controller = CrawlController::new(settings, fetcher, extractor, store);
    Ok(controller.run().await)
}
