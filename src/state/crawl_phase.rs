/// Coordinator lifecycle definitions
///
/// Answering queries is not a phase of its own: queries interleave freely
/// with fetch completions while crawling.
use std::fmt;

/// Represents where the coordinator is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrawlPhase {
    /// No seeds have been accepted yet
    #[default]
    Uninitialized,

    /// Seeds accepted; fetches and queries are being processed
    Crawling,

    /// An empty query ended the session; no further work is dispatched
    Terminated,
}

impl CrawlPhase {
    /// Returns true if `next` is a legal successor of this phase
    ///
    /// Termination is reachable from any phase; a crawl can only start once.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Uninitialized, Self::Crawling)
                | (Self::Uninitialized, Self::Terminated)
                | (Self::Crawling, Self::Terminated)
        )
    }

    /// Returns true once the session has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Crawling => "crawling",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
