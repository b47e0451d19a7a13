//! Environment overrides layered on top of the TOML file
//!
//! Secrets such as the database password are usually injected by the
//! deployment rather than committed to a config file.

use crate::config::types::Config;
use crate::ConfigError;
use std::str::FromStr;

pub const ENV_BASE_URL: &str = "JOBS_BASE_URL";
pub const ENV_PAGE_BOUND: &str = "JOBS_PAGE_BOUND";
pub const ENV_PAGE_DELAY_MS: &str = "JOBS_PAGE_DELAY_MS";
pub const ENV_NAVIGATION_TIMEOUT_SECS: &str = "JOBS_NAVIGATION_TIMEOUT_SECS";
pub const ENV_DB_HOST: &str = "JOBS_DB_HOST";
pub const ENV_DB_PORT: &str = "JOBS_DB_PORT";
pub const ENV_DB_USER: &str = "JOBS_DB_USER";
pub const ENV_DB_PASSWORD: &str = "JOBS_DB_PASSWORD";
pub const ENV_DB_NAME: &str = "JOBS_DB_NAME";
pub const ENV_DB_PATH: &str = "JOBS_DB_PATH";

/// Applies `JOBS_*` overrides to `config`
///
/// `lookup` resolves a variable name to its value; production code passes
/// `std::env::var`, tests pass a map.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_BASE_URL) {
        config.site.base_url = value;
    }
    if let Some(value) = parse_var(&lookup, ENV_PAGE_BOUND)? {
        config.crawler.page_bound = value;
    }
    if let Some(value) = parse_var(&lookup, ENV_PAGE_DELAY_MS)? {
        config.crawler.page_delay_ms = value;
    }
    if let Some(value) = parse_var(&lookup, ENV_NAVIGATION_TIMEOUT_SECS)? {
        config.fetcher.navigation_timeout_secs = value;
    }

    let db = &mut config.database;
    if let Some(value) = lookup(ENV_DB_HOST) {
        db.host = value;
    }
    if let Some(value) = parse_var(&lookup, ENV_DB_PORT)? {
        db.port = value;
    }
    if let Some(value) = lookup(ENV_DB_USER) {
        db.user = value;
    }
    if let Some(value) = lookup(ENV_DB_PASSWORD) {
        db.password = value;
    }
    if let Some(value) = lookup(ENV_DB_NAME) {
        db.name = value;
    }
    if let Some(value) = lookup(ENV_DB_PATH) {
        db.path = value;
    }

    Ok(())
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                name: name.to_string(),
                value: raw,
            }),
        None => Ok(None),
    }
}
