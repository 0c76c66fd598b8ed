//! Sumi-Index: a bounded crawler with an in-memory keyword index
//!
//! This crate crawls outward from a set of seed URLs with a small pool of fetch
//! workers, indexes every page it retrieves, and answers boolean-AND keyword
//! queries against the indexed pages while the crawl is still running.

pub mod config;
pub mod crawler;
pub mod index;
pub mod output;
pub mod session;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Index operations
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Indexing has already been started")]
    AlreadyStarted,

    #[error("Coordinator has terminated")]
    Terminated,

    #[error("Coordinator is no longer running")]
    CoordinatorGone,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Reasons a single page retrieval can fail
///
/// These never abort a crawl. A worker folds every one of them into a
/// failed fetch outcome for the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed")]
    Connect,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Expected text content, got {0}")]
    ContentMismatch(String),

    #[error("Failed to read body: {0}")]
    Body(String),

    #[error("Failed to read file: {0}")]
    Io(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Request failed: {0}")]
    Request(String),
}

/// Result type alias for Sumi-Index operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{
    spawn_coordinator, CoordinatorHandle, FetchOutcome, FetchedPage, HttpPageSource, PageSource,
    QueryReply,
};
pub use index::{tokenize, tokenize_query, IndexedPage, PageIndex, QueryResult, QueryTerms};
pub use state::CrawlPhase;
pub use crate::url::normalize_url;
