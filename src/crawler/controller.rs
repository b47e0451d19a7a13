//! Crawl controller - pagination and persistence orchestration
//!
//! A controller drives exactly one crawl through its phases:
//! - Seeding the dedup set from the store
//! - Paging through the listing, sequentially or with bounded concurrency
//! - Draining buffered records into the store
//! - Closing the fetcher and the store

use crate::config::Config;
use crate::crawler::extractor::RecordExtractor;
use crate::crawler::fetcher::{FetchResult, PageFetcher};
use crate::crawler::listing::{listing_url, page_number_of};
use crate::crawler::CrawlMode;
use crate::output::stats::{CrawlReport, CrawlTally};
use crate::state::{CrawlPhase, CrawlState, DedupSet, TerminationReason};
use crate::storage::{JobRecord, JobStore};
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{Instrument, Span};
use url::Url;

/// Pagination settings resolved from configuration
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub base_url: Url,
    pub mode: CrawlMode,

    /// Last page fetched in concurrent mode
    pub page_bound: u32,

    /// Page fetches in flight at once in concurrent mode
    pub max_concurrent_pages: usize,

    /// Pause between pages in sequential mode
    pub page_delay: Duration,

    /// Hard stop for sequential mode
    pub max_pages: Option<u32>,
}

impl CrawlSettings {
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        Ok(Self {
            base_url: Url::parse(&config.site.base_url)?,
            mode: config.crawler.mode,
            page_bound: config.crawler.page_bound,
            max_concurrent_pages: config.crawler.max_concurrent_pages as usize,
            page_delay: config.crawler.page_delay(),
            max_pages: config.crawler.max_pages,
        })
    }
}

/// Records extracted from one listing page, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub page_number: u32,
    pub records: Vec<JobRecord>,
}

impl PageResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Drives one crawl from seeding to close
pub struct CrawlController {
    settings: CrawlSettings,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn RecordExtractor>,
    store: Arc<dyn JobStore>,
    dedup: Arc<DedupSet>,
    tally: Arc<CrawlTally>,
    phase: CrawlPhase,
    span: Span,
}

impl CrawlController {
    pub fn new(
        settings: CrawlSettings,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn RecordExtractor>,
        store: Arc<dyn JobStore>,
    ) -> Self {
        let span = tracing::info_span!("crawl", mode = %settings.mode);

        Self {
            settings,
            fetcher,
            extractor,
            store,
            dedup: Arc::new(DedupSet::new()),
            tally: Arc::new(CrawlTally::new()),
            phase: CrawlPhase::Idle,
            span,
        }
    }

    /// Replaces the span every log line of this crawl is recorded under
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Uses an existing dedup set; seeding adds the store's URLs to it
    pub fn with_dedup(mut self, dedup: Arc<DedupSet>) -> Self {
        self.dedup = dedup;
        self
    }

    /// Handle to the dedup set, valid after `run` consumes the controller
    pub fn dedup(&self) -> Arc<DedupSet> {
        Arc::clone(&self.dedup)
    }

    /// Runs the crawl to completion
    ///
    /// Never fails: fetch and storage problems end paging or are counted in
    /// the report. The fetcher and the store are closed on every path.
    pub async fn run(mut self) -> CrawlReport {
        let span = self.span.clone();
        self.run_phases().instrument(span).await
    }

    async fn run_phases(&mut self) -> CrawlReport {
        let started_at = Utc::now();
        let clock = Instant::now();

        tracing::info!(
            "Starting {} crawl of {} using {} fetcher and {} store",
            self.settings.mode,
            self.settings.base_url,
            self.fetcher.name(),
            self.store.backend_name()
        );

        self.seed().await;

        self.advance(CrawlPhase::Paging);
        let (termination, buffered) = match self.settings.mode {
            CrawlMode::Sequential => (Some(self.page_sequentially().await), Vec::new()),
            CrawlMode::Concurrent => (None, self.page_concurrently().await),
        };

        self.drain(buffered).await;
        self.close().await;

        let report = CrawlReport {
            mode: self.settings.mode,
            termination,
            tally: self.tally.snapshot(),
            known_urls: self.dedup.len(),
            started_at,
            finished_at: Utc::now(),
            elapsed: clock.elapsed(),
        };
        report.log();
        report
    }

    fn advance(&mut self, next: CrawlPhase) {
        if !self.phase.can_transition_to(next) {
            tracing::warn!("Unexpected crawl phase change {} -> {}", self.phase, next);
        }
        tracing::debug!("Crawl phase: {} -> {}", self.phase, next);
        self.phase = next;
    }

    async fn seed(&mut self) {
        self.advance(CrawlPhase::Seeding);

        match self.store.list_existing_urls().await {
            Ok(urls) => {
                self.dedup.seed(urls);
                tracing::info!(
                    "Loaded {} existing job URLs from {} store",
                    self.dedup.len(),
                    self.store.backend_name()
                );
            }
            Err(e) => {
                tracing::warn!(
                    "Could not load existing job URLs, starting with an empty set: {}",
                    e
                );
            }
        }
    }

    /// Walks pages 1, 2, ... until a stop condition fires
    ///
    /// Checks run in a fixed order per page: already visited, fetch failure,
    /// no records, same records as the previous page. New records are
    /// inserted and committed before moving to the next page.
    async fn page_sequentially(&mut self) -> TerminationReason {
        let mut state = CrawlState::new();
        let mut page: u32 = 1;

        let reason = loop {
            if let Some(max) = self.settings.max_pages {
                if page > max {
                    tracing::info!("Reached the limit of {} pages. Stopping.", max);
                    break TerminationReason::PageLimit;
                }
            }

            if !state.mark_visited(page) {
                tracing::warn!("Page {} was already visited. Stopping.", page);
                break TerminationReason::RepeatedPage;
            }

            let (result, final_url) = match load_page(
                self.fetcher.as_ref(),
                self.extractor.as_ref(),
                &self.settings.base_url,
                &self.tally,
                page,
            )
            .await
            {
                Ok(loaded) => loaded,
                Err(failure) => {
                    tracing::warn!("Failed to retrieve page {}: {}. Stopping.", page, failure);
                    break TerminationReason::FetchFailed;
                }
            };

            if let Some(served) = page_number_of(&final_url) {
                if served != page && state.is_visited(served) {
                    tracing::warn!(
                        "Page {} was redirected to already visited page {}. Stopping.",
                        page,
                        served
                    );
                    break TerminationReason::RepeatedPage;
                }
            }

            if result.is_empty() {
                tracing::info!("No job records found on page {}. Stopping.", page);
                break TerminationReason::EmptyPage;
            }

            if state.repeats_last_page(&result.records) {
                tracing::warn!(
                    "Page {} repeats the records of the previous page. Stopping.",
                    page
                );
                break TerminationReason::LoopDetected;
            }

            let fresh = claim_new_records(&self.dedup, &self.tally, &result);
            tracing::info!(
                "Page {}: {} records, {} new",
                page,
                result.records.len(),
                fresh.len()
            );

            for record in &fresh {
                store_record(self.store.as_ref(), &self.tally, record).await;
            }
            commit(self.store.as_ref()).await;

            state.remember_page(result.records);

            page = match page.checked_add(1) {
                Some(next) => next,
                None => break TerminationReason::PageLimit,
            };

            if !self.settings.page_delay.is_zero() {
                tokio::time::sleep(self.settings.page_delay).await;
            }
        };

        state.terminate(reason);
        let reason = state.termination_reason().unwrap_or(reason);
        tracing::info!(
            "Paging stopped after {} pages: {}",
            state.pages_visited(),
            reason
        );
        reason
    }

    /// Fetches pages 1..=page_bound as parallel tasks and waits for all
    ///
    /// Each task filters its own records through the shared dedup set, so a
    /// job URL listed on two pages is claimed by exactly one of them. The
    /// claimed records are returned ordered by page for the drain phase.
    async fn page_concurrently(&mut self) -> Vec<JobRecord> {
        let semaphore = Arc::new(Semaphore::new(self.settings.max_concurrent_pages.max(1)));
        let base_url = Arc::new(self.settings.base_url.clone());

        tracing::info!(
            "Fetching pages 1..={} with at most {} in flight",
            self.settings.page_bound,
            self.settings.max_concurrent_pages
        );

        let tasks: Vec<_> = (1..=self.settings.page_bound)
            .map(|page| {
                let semaphore = Arc::clone(&semaphore);
                let fetcher = Arc::clone(&self.fetcher);
                let extractor = Arc::clone(&self.extractor);
                let dedup = Arc::clone(&self.dedup);
                let tally = Arc::clone(&self.tally);
                let base_url = Arc::clone(&base_url);

                tokio::spawn(
                    async move {
                        let _permit = semaphore.acquire_owned().await.ok()?;

                        match load_page(
                            fetcher.as_ref(),
                            extractor.as_ref(),
                            &base_url,
                            &tally,
                            page,
                        )
                        .await
                        {
                            Ok((result, _)) => {
                                if result.is_empty() {
                                    tracing::info!("No job records found on page {}", page);
                                }
                                let fresh = claim_new_records(&dedup, &tally, &result);
                                Some((page, fresh))
                            }
                            Err(failure) => {
                                tracing::warn!("Failed to retrieve page {}: {}", page, failure);
                                None
                            }
                        }
                    }
                    .instrument(Span::current()),
                )
            })
            .collect();

        let mut pages: Vec<(u32, Vec<JobRecord>)> = Vec::new();
        for outcome in join_all(tasks).await {
            match outcome {
                Ok(Some(page)) => pages.push(page),
                Ok(None) => {}
                Err(e) => tracing::error!("Page task failed: {}", e),
            }
        }

        pages.sort_by_key(|(page, _)| *page);
        pages.into_iter().flat_map(|(_, records)| records).collect()
    }

    /// Inserts buffered records as parallel tasks, then commits once
    async fn drain(&mut self, buffered: Vec<JobRecord>) {
        self.advance(CrawlPhase::Draining);

        if !buffered.is_empty() {
            tracing::info!("Inserting {} new job records", buffered.len());

            let tasks: Vec<_> = buffered
                .into_iter()
                .map(|record| {
                    let store = Arc::clone(&self.store);
                    let tally = Arc::clone(&self.tally);
                    tokio::spawn(
                        async move { store_record(store.as_ref(), &tally, &record).await }
                            .instrument(Span::current()),
                    )
                })
                .collect();

            for outcome in join_all(tasks).await {
                if let Err(e) = outcome {
                    self.tally.record_failed_insert();
                    tracing::error!("Insert task failed: {}", e);
                }
            }
        }

        commit(self.store.as_ref()).await;
    }

    async fn close(&mut self) {
        self.advance(CrawlPhase::Closed);
        self.fetcher.close().await;
        self.store.close().await;
    }
}

/// Fetches and extracts one page
///
/// Returns the page and the final URL after redirects, or the failed fetch
/// result.
async fn load_page(
    fetcher: &dyn PageFetcher,
    extractor: &dyn RecordExtractor,
    base_url: &Url,
    tally: &CrawlTally,
    page: u32,
) -> Result<(PageResult, String), FetchResult> {
    let url = listing_url(base_url.as_str(), page);
    tracing::info!("Scraping page {}: {}", page, url);

    match fetcher.fetch(&url).await {
        FetchResult::Success { final_url, body } => {
            tally.record_page_fetched();

            let extraction = extractor.extract(&body, base_url);
            if extraction.is_table_missing() {
                tracing::warn!("Listing table not found on page {}", page);
            }

            let records = extraction.into_records();
            tally.record_extracted(records.len());

            Ok((
                PageResult {
                    page_number: page,
                    records,
                },
                final_url,
            ))
        }
        failure => {
            tally.record_page_failed();
            Err(failure)
        }
    }
}

/// Keeps the records whose job URL this call is first to claim
fn claim_new_records(dedup: &DedupSet, tally: &CrawlTally, page: &PageResult) -> Vec<JobRecord> {
    page.records
        .iter()
        .filter(|record| {
            let claimed = dedup.insert_if_absent(&record.job_url);
            if !claimed {
                tracing::info!(
                    "Duplicate job URL found: {}. Skipping insertion.",
                    record.job_url
                );
                tally.record_duplicate();
            }
            claimed
        })
        .cloned()
        .collect()
}

async fn store_record(store: &dyn JobStore, tally: &CrawlTally, record: &JobRecord) {
    match store.insert(record).await {
        Ok(()) => {
            tally.record_inserted();
            tracing::debug!("Inserted job {}", record.job_url);
        }
        Err(e) if e.is_duplicate() => {
            tally.record_duplicate();
            tracing::info!("Job {} is already stored, skipping", record.job_url);
        }
        Err(e) => {
            tally.record_failed_insert();
            tracing::error!("Error inserting job {}: {}", record.job_url, e);
        }
    }
}

async fn commit(store: &dyn JobStore) {
    if let Err(e) = store.commit().await {
        tracing::error!("Failed to commit inserted jobs: {}", e);
    }
}
