//! Storage traits and error types
//!
//! This module defines the trait interface for job store backends and
//! associated error types.

use crate::storage::JobRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// A row with this job URL already exists; callers log and discard it
    #[error("Duplicate job URL: {0}")]
    DuplicateKey(String),

    /// No connection could be made, or the pool was closed
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),
}

impl StorageError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateKey(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable home of the `jobs` table
///
/// Implementations must be safe to share between insert tasks: either each
/// call takes its own pooled connection, or calls are serialized on a single
/// connection internally.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Short backend name for log lines
    fn backend_name(&self) -> &'static str;

    /// Returns every stored job URL; used once per crawl to seed the dedup set
    async fn list_existing_urls(&self) -> StorageResult<Vec<String>>;

    /// Inserts one record
    ///
    /// A record whose `job_url` is already stored yields
    /// [`StorageError::DuplicateKey`] and leaves the stored row untouched.
    async fn insert(&self, record: &JobRecord) -> StorageResult<()>;

    /// Batch boundary
    ///
    /// Backends running in autocommit mode treat this as a no-op, so callers
    /// may invoke it after every page or once at the end.
    async fn commit(&self) -> StorageResult<()> {
        Ok(())
    }

    /// Number of stored jobs
    async fn count_jobs(&self) -> StorageResult<u64>;

    /// Releases connections; the store must not be used afterwards
    async fn close(&self) {}
}
