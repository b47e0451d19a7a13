use crate::config::types::{
    Config, CrawlerConfig, DatabaseBackend, DatabaseConfig, FetcherBackend, FetcherConfig,
    SiteConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_database_config(&config.database)?;
    Ok(())
}

/// Validates the target site settings
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.table_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "table-id cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_bound < 1 || config.page_bound > 100 {
        return Err(ConfigError::Validation(format!(
            "page-bound must be between 1 and 100, got {}",
            config.page_bound
        )));
    }

    if config.max_concurrent_pages < 1 || config.max_concurrent_pages > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-pages must be between 1 and 100, got {}",
            config.max_concurrent_pages
        )));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "navigation-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.backend == FetcherBackend::Browser {
        Url::parse(&config.webdriver_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver-url: {}", e)))?;
    }

    Ok(())
}

/// Validates database configuration for the selected backend
fn validate_database_config(config: &DatabaseConfig) -> Result<(), ConfigError> {
    match config.backend {
        DatabaseBackend::Sqlite => {
            if config.path.is_empty() {
                return Err(ConfigError::Validation(
                    "database path cannot be empty".to_string(),
                ));
            }
        }
        DatabaseBackend::Postgres => {
            for (field, value) in [
                ("host", &config.host),
                ("user", &config.user),
                ("name", &config.name),
            ] {
                if value.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "database {} is required for the postgres backend",
                        field
                    )));
                }
            }

            if config.max_connections < 1 {
                return Err(ConfigError::Validation(
                    "max-connections must be >= 1".to_string(),
                ));
            }
        }
    }

    Ok(())
}
