//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the JobStore trait.
//! The single connection is serialized behind a mutex, so concurrent insert
//! tasks queue up on it instead of racing.

use crate::storage::schema::{initialize_schema, COUNT_JOBS_SQL, SELECT_JOB_URLS_SQL};
use crate::storage::traits::{JobStore, StorageError, StorageResult};
use crate::storage::JobRecord;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite job store
pub struct SqliteJobStore {
    conn: Mutex<Connection>,
}

impl SqliteJobStore {
    /// Opens (or creates) the database file at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteJobStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn list_existing_urls(&self) -> StorageResult<Vec<String>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(SELECT_JOB_URLS_SQL)?;

        let urls = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(urls)
    }

    async fn insert(&self, record: &JobRecord) -> StorageResult<()> {
        let changed = self.lock().execute(
            "INSERT OR IGNORE INTO jobs (vacancy_name, company_name, published, deadline, job_url)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.vacancy_name,
                record.company_name,
                record.published,
                record.deadline,
                record.job_url
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::DuplicateKey(record.job_url.clone()));
        }

        Ok(())
    }

    async fn count_jobs(&self) -> StorageResult<u64> {
        let count: i64 = self
            .lock()
            .query_row(COUNT_JOBS_SQL, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
