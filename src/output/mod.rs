//! Output module for crawl statistics
//!
//! This module handles:
//! - Immutable statistics snapshots taken by the coordinator
//! - Rendering those snapshots for the console

pub mod stats;

pub use stats::{print_statistics, write_statistics, CrawlStatistics};
