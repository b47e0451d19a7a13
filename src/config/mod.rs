//! Configuration module for Jobs-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and layering environment overrides on top of them.
//!
//! # Example
//!
//! ```no_run
//! use jobs_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawling {}", config.site.base_url);
//! ```

mod env;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ColumnLayout, Config, CrawlerConfig, DatabaseBackend, DatabaseConfig, FetcherBackend,
    FetcherConfig, SiteConfig,
};

// Re-export parser functions
pub use env::apply_env_overrides;
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, load_default_config, parse_config,
};
pub use validation::validate;
