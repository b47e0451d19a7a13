//! Stand-in store used when no database connection could be opened
//!
//! The crawl still runs: seeding yields nothing and every insert fails with
//! `Unavailable`, which the controller logs and counts.

use crate::storage::traits::{JobStore, StorageError, StorageResult};
use crate::storage::JobRecord;
use async_trait::async_trait;

pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StorageError {
        StorageError::Unavailable(self.reason.clone())
    }
}

#[async_trait]
impl JobStore for UnavailableStore {
    fn backend_name(&self) -> &'static str {
        "unavailable"
    }

    async fn list_existing_urls(&self) -> StorageResult<Vec<String>> {
        Err(self.error())
    }

    async fn insert(&self, _record: &JobRecord) -> StorageResult<()> {
        Err(self.error())
    }

    async fn count_jobs(&self) -> StorageResult<u64> {
        Err(self.error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_call_fails_unavailable() {
        let store = UnavailableStore::new("connection refused");
        let record = JobRecord {
            vacancy_name: "Cook".to_string(),
            company_name: String::new(),
            published: String::new(),
            deadline: String::new(),
            job_url: "https://jobs.ge/en/?view=jobs&id=1".to_string(),
        };

        assert!(store.list_existing_urls().await.unwrap_err().is_unavailable());
        assert!(store.insert(&record).await.unwrap_err().is_unavailable());
        assert!(store.count_jobs().await.unwrap_err().is_unavailable());
        assert!(store.commit().await.is_ok());
    }
}
