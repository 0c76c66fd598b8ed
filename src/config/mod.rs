//! Configuration module for Sumi-Index
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a crawl can run without any file at all.
//!
//! # Example
//!
//! ```no_run
//! use sumi_index::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sumi-index.toml")).unwrap();
//! println!("Crawler page budget: {}", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, SessionConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

pub use validation::validate;
