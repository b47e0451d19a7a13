//! Output module for crawl reporting
//!
//! This module handles:
//! - Counting fetches, duplicates and inserts while a crawl runs
//! - The end-of-run report returned by the controller
//! - Printing store statistics for `--stats`

pub mod stats;

pub use stats::{print_report, print_store_statistics, CrawlReport, CrawlTally, TallySnapshot};
