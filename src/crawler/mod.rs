//! Crawler module for page fetching, indexing and query answering
//!
//! This module contains the core crawling logic, including:
//! - The coordinator actor that owns the frontier, visited set and index
//! - Fetch workers and the `PageSource` they retrieve pages through
//! - HTML parsing and link extraction
//! - The messages that tie them together

mod coordinator;
mod fetcher;
mod frontier;
mod messages;
mod parser;
mod worker;

pub use coordinator::{spawn_coordinator, Coordinator, CoordinatorHandle, CrawlState, Dispatch};
pub use fetcher::{build_http_client, FetchedPage, HttpPageSource, PageSource};
pub use frontier::Frontier;
pub use messages::{CoordinatorMessage, FetchOutcome, FetchRequest, QueryReply, WorkerId};
pub use parser::{parse_html, ParsedPage};
pub use worker::{fetch_outcome, spawn_worker, WorkerHandle};
