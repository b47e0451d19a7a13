use serde::Deserialize;
use std::time::Duration;

use crate::crawler::CrawlMode;

/// Main configuration structure for Jobs-Harvest
///
/// Every section is optional in the TOML file; missing keys fall back to the
/// defaults below, which target the production job board.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub fetcher: FetcherConfig,
    pub database: DatabaseConfig,
}

/// Target site layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Root of the job board, e.g. "https://jobs.ge"
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// `id` attribute of the listing table
    #[serde(rename = "table-id")]
    pub table_id: String,

    /// Column offsets inside a listing row
    pub columns: ColumnLayout,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://jobs.ge".to_string(),
            table_id: "temp_table".to_string(),
            columns: ColumnLayout::default(),
        }
    }
}

/// Zero-based `td` offsets of each field in a listing row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    /// Cell holding the vacancy title and the link to the posting
    pub title: usize,
    pub company: usize,
    pub published: usize,
    pub deadline: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            title: 1,
            company: 3,
            published: 4,
            deadline: 5,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Pagination policy
    pub mode: CrawlMode,

    /// Highest page fetched in concurrent mode (pages 1..=page-bound)
    #[serde(rename = "page-bound")]
    pub page_bound: u32,

    /// Maximum number of page fetches in flight at once (concurrent mode)
    #[serde(rename = "max-concurrent-pages")]
    pub max_concurrent_pages: u32,

    /// Pause between two pages in sequential mode (milliseconds)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: u64,

    /// Optional hard stop for sequential mode
    #[serde(rename = "max-pages")]
    pub max_pages: Option<u32>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            mode: CrawlMode::Sequential,
            page_bound: 5,
            max_concurrent_pages: 5,
            page_delay_ms: 2000,
            max_pages: None,
        }
    }
}

impl CrawlerConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

/// Which page fetcher implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherBackend {
    Http,
    Browser,
}

/// Page fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub backend: FetcherBackend,

    /// Upper bound on a single navigation or HTTP response (seconds)
    #[serde(rename = "navigation-timeout-secs")]
    pub navigation_timeout_secs: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// WebDriver endpoint used by the browser backend
    #[serde(rename = "webdriver-url")]
    pub webdriver_url: String,

    pub headless: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            backend: FetcherBackend::Http,
            navigation_timeout_secs: 180,
            user_agent: format!("jobs-harvest/{}", env!("CARGO_PKG_VERSION")),
            webdriver_url: "http://localhost:4444".to_string(),
            headless: true,
        }
    }
}

impl FetcherConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

/// Which relational store backs the `jobs` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,

    /// SQLite database file
    pub path: String,

    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,

    #[serde(rename = "max-connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Sqlite,
            path: "./jobs.db".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            user: String::new(),
            password: String::new(),
            name: String::new(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// Where the selected backend stores jobs, safe to print
    pub fn location(&self) -> String {
        match self.backend {
            DatabaseBackend::Sqlite => self.path.clone(),
            DatabaseBackend::Postgres => self.redacted_url(),
        }
    }

    /// Connection target for log lines, password masked
    pub fn redacted_url(&self) -> String {
        format!(
            "postgres://{}:***@{}:{}/{}",
            self.user, self.host, self.port, self.name
        )
    }
}
