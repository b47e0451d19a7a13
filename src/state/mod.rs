//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `DedupSet`: job URLs already known, shared across page tasks
//! - `CrawlState`: visited pages and the previous page's records
//! - `CrawlPhase` / `TerminationReason`: controller lifecycle and stop reasons

mod crawl_state;
mod dedup;

// Re-export main types
pub use crawl_state::{CrawlPhase, CrawlState, TerminationReason};
pub use dedup::DedupSet;
