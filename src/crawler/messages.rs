//! Messages exchanged between the coordinator, its workers and the session
//!
//! The coordinator's mailbox carries exactly one enum, matched exhaustively;
//! replies travel back on oneshot channels.

use crate::index::{QueryResult, QueryTerms};
use crate::output::CrawlStatistics;
use crate::FetchError;
use std::fmt;
use tokio::sync::oneshot;
use url::Url;

/// Identifies one fetch worker in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub usize);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// A single unit of work for a fetch worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: Url,
}

/// Result of one dispatched fetch, consumed exactly once by the coordinator
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The page was retrieved as text
    ///
    /// `url` is the dispatched URL; `final_url` is where the content was
    /// served from and is the base for its relative links.
    Success {
        url: Url,
        final_url: Url,
        content: String,
    },

    /// The page could not be retrieved; it still counts against the budget
    Failure { url: Url, reason: FetchError },
}

impl FetchOutcome {
    pub fn url(&self) -> &Url {
        match self {
            Self::Success { url, .. } | Self::Failure { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Coordinator's answer to a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryReply {
    /// Aggregate statistics for the query terms
    Answer(QueryResult),

    /// The session is over; stop asking
    Terminated,
}

/// Everything the coordinator's mailbox can receive
#[derive(Debug)]
pub enum CoordinatorMessage {
    /// Seed the frontier and dispatch the first wave of fetches
    StartIndexing {
        seeds: Vec<String>,
        reply: oneshot::Sender<crate::Result<usize>>,
    },

    /// A worker finished the fetch it was given
    FetchCompleted {
        worker: WorkerId,
        outcome: FetchOutcome,
    },

    /// Evaluate query terms; empty terms end the session
    Query {
        terms: QueryTerms,
        reply: oneshot::Sender<QueryReply>,
    },

    /// Snapshot of the crawl for display
    Statistics {
        reply: oneshot::Sender<CrawlStatistics>,
    },
}
