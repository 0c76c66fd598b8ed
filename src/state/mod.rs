//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the coordinator's lifecycle (uninitialized, crawling, terminated)

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
