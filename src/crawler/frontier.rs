//! Frontier of URLs waiting to be fetched
//!
//! Entries are deduplicated on insertion and handed out first-in, first-out.
//! FIFO is a convenience for reproducible runs, not a breadth-first promise:
//! with several workers reporting in arbitrary order, the visit order is not
//! a traversal of the link graph.

use std::collections::{HashSet, VecDeque};
use url::Url;

/// Set of known-but-unvisited URLs
#[derive(Debug, Default)]
pub struct Frontier {
    /// Pending URLs in insertion order
    queue: VecDeque<Url>,

    /// Membership index over `queue`
    members: HashSet<Url>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL; returns false if it was already pending
    pub fn push(&mut self, url: Url) -> bool {
        if !self.members.insert(url.clone()) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    /// Removes and returns the next URL to dispatch
    pub fn pop(&mut self) -> Option<Url> {
        let url = self.queue.pop_front()?;
        self.members.remove(&url);
        Some(url)
    }

    /// Returns a URL to the front of the frontier after a failed hand-off
    pub fn push_front(&mut self, url: Url) -> bool {
        if !self.members.insert(url.clone()) {
            return false;
        }
        self.queue.push_front(url);
        true
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.members.contains(url)
    }

    /// Returns the number of URLs in the frontier
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
