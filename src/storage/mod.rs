//! Storage module for persisting job records
//!
//! This module handles all database operations for the crawler, including:
//! - The `jobs` table schema for SQLite and PostgreSQL
//! - Seeding the dedup set from stored job URLs
//! - Duplicate-tolerant inserts
//! - Falling back to an unavailable store when no connection can be made

mod postgres;
mod schema;
mod sqlite;
mod traits;
mod unavailable;

pub use postgres::PostgresJobStore;
pub use sqlite::SqliteJobStore;
pub use traits::{JobStore, StorageError, StorageResult};
pub use unavailable::UnavailableStore;

use crate::config::{DatabaseBackend, DatabaseConfig};
use std::path::Path;
use std::sync::Arc;

/// One vacancy row from the listing table
///
/// `job_url` is the identity key; the other fields are descriptive and may be
/// empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobRecord {
    pub vacancy_name: String,
    pub company_name: String,
    /// Publication date as printed by the site
    pub published: String,
    /// Application deadline as printed by the site
    pub deadline: String,
    /// Absolute URL of the posting
    pub job_url: String,
}

/// Opens the store selected by `config`
///
/// # Returns
///
/// * `Ok(Arc<dyn JobStore>)` - Connected store
/// * `Err(StorageError)` - The backend could not be opened at all
pub async fn open_store(config: &DatabaseConfig) -> StorageResult<Arc<dyn JobStore>> {
    match config.backend {
        DatabaseBackend::Sqlite => {
            let store = SqliteJobStore::new(Path::new(&config.path))?;
            Ok(Arc::new(store))
        }
        DatabaseBackend::Postgres => {
            let store = PostgresJobStore::connect(config).await?;
            Ok(Arc::new(store))
        }
    }
}

/// Opens the configured store, degrading to [`UnavailableStore`] on failure
///
/// A crawl without storage still fetches and logs pages; it just cannot
/// persist anything.
pub async fn open_store_or_unavailable(config: &DatabaseConfig) -> Arc<dyn JobStore> {
    match open_store(config).await {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!(
                "Could not open {:?} store, continuing without storage: {}",
                config.backend,
                e
            );
            Arc::new(UnavailableStore::new(e.to_string()))
        }
    }
}
