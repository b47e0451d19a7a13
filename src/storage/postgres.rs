//! PostgreSQL storage implementation
//!
//! Each call checks a connection out of a sqlx pool, so concurrent insert
//! tasks never share a session.

use crate::config::DatabaseConfig;
use crate::storage::schema::{COUNT_JOBS_SQL, POSTGRES_SCHEMA_SQL, SELECT_JOB_URLS_SQL};
use crate::storage::traits::{JobStore, StorageError, StorageResult};
use crate::storage::JobRecord;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::debug;

/// PostgreSQL job store
pub struct PostgresJobStore {
    pool: PgPool,
}

impl PostgresJobStore {
    /// Builds a pool for `config` and makes sure the `jobs` table exists
    ///
    /// The pool connects lazily; the schema check is the first real round
    /// trip, so an unreachable server surfaces here as
    /// [`StorageError::Unavailable`].
    pub async fn connect(config: &DatabaseConfig) -> StorageResult<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_lazy_with(options);

        let store = Self { pool };
        store.ensure_schema().await?;

        debug!("Connected to PostgreSQL at {}", config.redacted_url());

        Ok(store)
    }

    async fn ensure_schema(&self) -> StorageResult<()> {
        sqlx::query(POSTGRES_SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }
}

/// Maps connection-level sqlx failures to `Unavailable`; query failures keep
/// their original error
fn classify(error: sqlx::Error) -> StorageError {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StorageError::Unavailable(error.to_string())
        }
        sqlx::Error::Io(e) => StorageError::Unavailable(e.to_string()),
        sqlx::Error::Tls(e) => StorageError::Unavailable(e.to_string()),
        other => StorageError::Postgres(other),
    }
}

#[async_trait]
impl JobStore for PostgresJobStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn list_existing_urls(&self) -> StorageResult<Vec<String>> {
        let urls = sqlx::query_scalar::<_, String>(SELECT_JOB_URLS_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;
        Ok(urls)
    }

    async fn insert(&self, record: &JobRecord) -> StorageResult<()> {
        let result = sqlx::query(
            "INSERT INTO jobs (vacancy_name, company_name, published, deadline, job_url)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (job_url) DO NOTHING",
        )
        .bind(&record.vacancy_name)
        .bind(&record.company_name)
        .bind(&record.published)
        .bind(&record.deadline)
        .bind(&record.job_url)
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::DuplicateKey(record.job_url.clone()));
        }

        Ok(())
    }

    async fn count_jobs(&self) -> StorageResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(COUNT_JOBS_SQL)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)?;
        Ok(count as u64)
    }

    async fn close(&self) {
        self.pool.close().await;
        debug!("PostgreSQL pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_unavailable() {
        assert!(classify(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(classify(sqlx::Error::PoolClosed).is_unavailable());

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(classify(sqlx::Error::Io(io)).is_unavailable());
    }

    #[test]
    fn test_query_errors_keep_their_kind() {
        let err = classify(sqlx::Error::RowNotFound);
        assert!(matches!(err, StorageError::Postgres(sqlx::Error::RowNotFound)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let config = DatabaseConfig {
            backend: crate::config::DatabaseBackend::Postgres,
            host: "127.0.0.1".to_string(),
            port: 1,
            user: "harvest".to_string(),
            password: "x".to_string(),
            name: "jobs".to_string(),
            ..DatabaseConfig::default()
        };

        let result = PostgresJobStore::connect(&config).await;
        assert!(matches!(result, Err(StorageError::Unavailable(_))));
    }
}
