//! Crawl statistics snapshots
//!
//! The coordinator never lends out its frontier, visited set or index; callers
//! that want to display progress get one of these copies instead.

use crate::state::CrawlPhase;
use chrono::{DateTime, Utc};
use std::io::{self, Write};

/// Point-in-time summary of a crawl
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    /// Lifecycle phase when the snapshot was taken
    pub phase: CrawlPhase,

    /// Page budget
    pub max_pages: usize,

    /// URLs whose fetch completed (success or failure)
    pub visited: usize,

    /// Pages successfully indexed
    pub indexed: usize,

    /// Fetches that failed
    pub failed: usize,

    /// URLs still waiting in the frontier
    pub frontier: usize,

    /// Fetches dispatched but not yet reported
    pub in_flight: usize,

    /// Size of the worker pool
    pub workers: usize,

    /// Workers with nothing to do
    pub idle_workers: usize,

    /// When the coordinator accepted its seeds
    pub started_at: Option<DateTime<Utc>>,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
}

impl CrawlStatistics {
    /// Returns true once the page budget has been used up
    pub fn budget_exhausted(&self) -> bool {
        self.visited >= self.max_pages
    }

    /// Returns true when no fetch is outstanding
    ///
    /// A settled crawl makes no further progress on its own.
    pub fn is_settled(&self) -> bool {
        self.in_flight == 0
    }

    /// Seconds between the start of the crawl and this snapshot
    pub fn elapsed_seconds(&self) -> Option<i64> {
        self.started_at
            .map(|started| (self.taken_at - started).num_seconds())
    }
}

/// Writes statistics in a human-readable block
pub fn write_statistics<W: Write>(out: &mut W, stats: &CrawlStatistics) -> io::Result<()> {
    writeln!(out, "=== Crawl Statistics ===")?;
    writeln!(out, "  Phase: {}", stats.phase)?;
    writeln!(out, "  Visited: {} / {} page budget", stats.visited, stats.max_pages)?;
    writeln!(out, "  Indexed: {}", stats.indexed)?;
    writeln!(out, "  Failed: {}", stats.failed)?;
    writeln!(out, "  Frontier: {}", stats.frontier)?;
    writeln!(out, "  In flight: {}", stats.in_flight)?;
    writeln!(
        out,
        "  Workers: {} ({} idle)",
        stats.workers, stats.idle_workers
    )?;

    if let Some(elapsed) = stats.elapsed_seconds() {
        writeln!(out, "  Elapsed: {}s", elapsed)?;
    }

    let success_rate = if stats.visited > 0 {
        (stats.indexed as f64 / stats.visited as f64) * 100.0
    } else {
        0.0
    };
    writeln!(
        out,
        "Success Rate: {:.1}% ({} / {} pages successfully indexed)",
        success_rate, stats.indexed, stats.visited
    )
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = write_statistics(&mut out, stats) {
        tracing::warn!("Failed to print statistics: {}", e);
    }
}
