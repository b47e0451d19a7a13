//! Crawl lifecycle and pagination bookkeeping
//!
//! This module defines the phases a crawl moves through, the reasons a
//! sequential crawl stops, and the per-crawl state used to detect them.

use crate::storage::JobRecord;
use std::collections::HashSet;
use std::fmt;

/// Lifecycle phase of a crawl controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Constructed, nothing run yet
    Idle,

    /// Loading known job URLs from the store
    Seeding,

    /// Fetching and filtering listing pages
    Paging,

    /// Flushing buffered records to the store
    Draining,

    /// Resources released; terminal
    Closed,
}

impl CrawlPhase {
    /// Returns true if moving from `self` to `next` is a legal step
    ///
    /// Phases only advance. Any phase may jump straight to `Closed` so that
    /// resources are released even when an earlier phase bails out.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Seeding)
                | (Self::Seeding, Self::Paging)
                | (Self::Paging, Self::Draining)
                | (Self::Idle | Self::Seeding | Self::Paging | Self::Draining, Self::Closed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Seeding => "seeding",
            Self::Paging => "paging",
            Self::Draining => "draining",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a sequential crawl stopped paging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// The page number had already been fetched in this crawl
    RepeatedPage,

    /// Transport error, timeout, non-success status or empty body
    FetchFailed,

    /// Extraction produced no records
    EmptyPage,

    /// The page repeated the previous page's records exactly
    LoopDetected,

    /// The configured `max-pages` cap was reached
    PageLimit,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RepeatedPage => "repeated_page",
            Self::FetchFailed => "fetch_failed",
            Self::EmptyPage => "empty_page",
            Self::LoopDetected => "loop_detected",
            Self::PageLimit => "page_limit",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-crawl pagination state, owned by the controller
#[derive(Debug, Default)]
pub struct CrawlState {
    visited_pages: HashSet<u32>,
    last_page_records: Vec<JobRecord>,
    termination_reason: Option<TerminationReason>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `page` as visited; returns false if it already was
    pub fn mark_visited(&mut self, page: u32) -> bool {
        self.visited_pages.insert(page)
    }

    pub fn is_visited(&self, page: u32) -> bool {
        self.visited_pages.contains(&page)
    }

    pub fn pages_visited(&self) -> usize {
        self.visited_pages.len()
    }

    /// Returns true if `records` equals the previous page's records,
    /// element for element and in the same order
    pub fn repeats_last_page(&self, records: &[JobRecord]) -> bool {
        !self.last_page_records.is_empty() && self.last_page_records.as_slice() == records
    }

    /// Remembers `records` as the most recent page for loop detection
    pub fn remember_page(&mut self, records: Vec<JobRecord>) {
        self.last_page_records = records;
    }

    /// Records the first termination reason; later calls are ignored
    pub fn terminate(&mut self, reason: TerminationReason) {
        if self.termination_reason.is_none() {
            self.termination_reason = Some(reason);
        }
    }

    pub fn termination_reason(&self) -> Option<TerminationReason> {
        self.termination_reason
    }
}
