//! Crawl counters and the end-of-run report
//!
//! Counters are atomics so page tasks and insert tasks can bump them without
//! holding any lock shared with the dedup set.

use crate::crawler::CrawlMode;
use crate::state::TerminationReason;
use crate::storage::JobStore;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters for one crawl
#[derive(Debug, Default)]
pub struct CrawlTally {
    pages_fetched: AtomicU64,
    pages_failed: AtomicU64,
    records_extracted: AtomicU64,
    duplicates_skipped: AtomicU64,
    inserted: AtomicU64,
    failed_inserts: AtomicU64,
}

impl CrawlTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page_failed(&self) {
        self.pages_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_extracted(&self, count: usize) {
        self.records_extracted
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_inserted(&self) {
        self.inserted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed_insert(&self) {
        self.failed_inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> TallySnapshot {
        TallySnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            pages_failed: self.pages_failed.load(Ordering::Relaxed),
            records_extracted: self.records_extracted.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            inserted: self.inserted.load(Ordering::Relaxed),
            failed_inserts: self.failed_inserts.load(Ordering::Relaxed),
        }
    }
}

/// Frozen counter values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TallySnapshot {
    pub pages_fetched: u64,
    pub pages_failed: u64,
    pub records_extracted: u64,
    pub duplicates_skipped: u64,
    pub inserted: u64,
    pub failed_inserts: u64,
}

impl fmt::Display for TallySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages fetched ({} failed), {} records extracted, {} duplicates skipped, {} inserted, {} insert failures",
            self.pages_fetched,
            self.pages_failed,
            self.records_extracted,
            self.duplicates_skipped,
            self.inserted,
            self.failed_inserts
        )
    }
}

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub mode: CrawlMode,

    /// Why paging stopped; None in concurrent mode, which always covers its
    /// whole page range
    pub termination: Option<TerminationReason>,

    pub tally: TallySnapshot,

    /// Size of the dedup set at the end of the crawl
    pub known_urls: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Logs the report at info level
    pub fn log(&self) {
        tracing::info!(
            "Crawl finished ({} mode, stop reason: {}): {}",
            self.mode,
            self.termination
                .map(|r| r.as_str())
                .unwrap_or("page range exhausted"),
            self.tally
        );
        tracing::info!("{} job URLs known after crawl", self.known_urls);
        tracing::info!(
            "Total execution time: {:.2} seconds",
            self.elapsed.as_secs_f64()
        );
    }
}

/// Prints a human-readable crawl summary to stdout
pub fn print_report(report: &CrawlReport) {
    println!("=== Jobs-Harvest Crawl Report ===\n");
    println!("Mode:              {}", report.mode);
    println!(
        "Started:           {}",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "Finished:          {}",
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Elapsed:           {:.2}s", report.elapsed.as_secs_f64());
    if let Some(reason) = report.termination {
        println!("Stop reason:       {}", reason);
    }
    println!();
    println!("Pages fetched:     {}", report.tally.pages_fetched);
    println!("Pages failed:      {}", report.tally.pages_failed);
    println!("Records extracted: {}", report.tally.records_extracted);
    println!("Duplicates:        {}", report.tally.duplicates_skipped);
    println!("Inserted:          {}", report.tally.inserted);
    println!("Insert failures:   {}", report.tally.failed_inserts);
    println!("Known job URLs:    {}", report.known_urls);
}

/// Prints store-level statistics to stdout
///
/// Used by `--stats`, which reports on the database without crawling.
pub async fn print_store_statistics(store: &dyn JobStore) -> crate::Result<()> {
    let total = store.count_jobs().await?;

    println!("=== Jobs-Harvest Store Statistics ===\n");
    println!("Backend:           {}", store.backend_name());
    println!("Stored jobs:       {}", total);

    Ok(())
}
