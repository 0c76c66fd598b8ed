//! Crawler coordinator - frontier, dedup, budget and query orchestration
//!
//! The coordinator is a single task that owns all mutable crawl state:
//! - the frontier of pending URLs
//! - the set of URLs handed to workers and not yet reported
//! - the visited set and the page index
//!
//! Workers and the query session only ever talk to it through its mailbox,
//! so every mutation happens on one task, one message at a time.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::PageSource;
use crate::crawler::frontier::Frontier;
use crate::crawler::messages::{CoordinatorMessage, FetchOutcome, QueryReply, WorkerId};
use crate::crawler::worker::{spawn_worker, WorkerHandle};
use crate::index::{IndexedPage, PageIndex, QueryTerms};
use crate::output::CrawlStatistics;
use crate::state::CrawlPhase;
use crate::url::normalize_url;
use crate::IndexError;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use url::Url;

/// A URL assigned to a specific worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub worker: WorkerId,
    pub url: Url,
}

/// Crawl state machine, free of any I/O
///
/// Every transition returns the dispatches the caller must carry out, which
/// keeps the invariants checkable without running workers.
#[derive(Debug)]
pub struct CrawlState {
    phase: CrawlPhase,
    max_pages: usize,
    frontier: Frontier,
    in_flight: HashMap<Url, WorkerId>,
    visited: HashSet<Url>,
    failed: usize,
    index: PageIndex,
    workers: usize,
    idle: BTreeSet<WorkerId>,
    started_at: Option<DateTime<Utc>>,
}

impl CrawlState {
    /// Creates a state machine with a page budget and a worker pool size
    ///
    /// # Arguments
    ///
    /// * `max_pages` - Most URLs that may ever be visited, failures included
    /// * `workers` - Number of workers; all start out idle
    pub fn new(max_pages: usize, workers: usize) -> Self {
        Self {
            phase: CrawlPhase::Uninitialized,
            max_pages,
            frontier: Frontier::new(),
            in_flight: HashMap::new(),
            visited: HashSet::new(),
            failed: 0,
            index: PageIndex::new(),
            workers,
            idle: (0..workers).map(WorkerId).collect(),
            started_at: None,
        }
    }

    /// Accepts the seed URLs and assigns one URL to each worker that can take one
    ///
    /// Returns the number of seeds that made it into the frontier along with
    /// the first wave of dispatches. Seeds that fail to normalize are skipped.
    ///
    /// # Errors
    ///
    /// * `IndexError::AlreadyStarted` - indexing was started before
    /// * `IndexError::Terminated` - the session already ended
    pub fn start_indexing(&mut self, seeds: &[String]) -> crate::Result<(usize, Vec<Dispatch>)> {
        match self.phase {
            CrawlPhase::Uninitialized => {}
            CrawlPhase::Crawling => return Err(IndexError::AlreadyStarted),
            CrawlPhase::Terminated => return Err(IndexError::Terminated),
        }

        let mut accepted = 0;
        for seed in seeds {
            match normalize_url(seed) {
                Ok(url) => {
                    if self.merge(url) {
                        accepted += 1;
                    }
                }
                Err(e) => tracing::warn!("Skipping seed {}: {}", seed, e),
            }
        }

        self.transition(CrawlPhase::Crawling);
        self.started_at = Some(Utc::now());

        let dispatches = (0..self.workers)
            .map(WorkerId)
            .filter_map(|worker| self.next_dispatch(worker))
            .collect();

        Ok((accepted, dispatches))
    }

    /// Records a completed fetch and picks the reporting worker's next URL
    ///
    /// A success is indexed and its links merged into the frontier; a failure
    /// is only marked visited. Both count against the budget.
    pub fn on_fetch_outcome(&mut self, worker: WorkerId, outcome: FetchOutcome) -> Option<Dispatch> {
        if self.phase.is_terminal() {
            tracing::debug!("Ignoring outcome for {} after termination", outcome.url());
            return None;
        }

        match self.in_flight.get(outcome.url()).copied() {
            Some(owner) if owner == worker => {
                self.in_flight.remove(outcome.url());
                self.record(outcome);
            }
            Some(owner) => {
                tracing::warn!(
                    "{} reported {} which was assigned to {}",
                    worker,
                    outcome.url(),
                    owner
                );
                return None;
            }
            None => {
                tracing::warn!("{} reported {} which was not in flight", worker, outcome.url());
                return None;
            }
        }

        self.next_dispatch(worker)
    }

    /// Answers a query; empty terms end the session
    pub fn on_query(&mut self, terms: &QueryTerms) -> QueryReply {
        if terms.is_empty() {
            if !self.phase.is_terminal() {
                self.transition(CrawlPhase::Terminated);
            }
            return QueryReply::Terminated;
        }

        if self.phase.is_terminal() {
            return QueryReply::Terminated;
        }

        QueryReply::Answer(self.index.query(terms))
    }

    /// Returns a dispatched URL to the frontier when it could not be handed off
    pub fn abandon_dispatch(&mut self, dispatch: &Dispatch) {
        if self.in_flight.remove(&dispatch.url).is_some() {
            self.frontier.push_front(dispatch.url.clone());
        }
        self.idle.insert(dispatch.worker);
    }

    /// Takes a snapshot for display
    pub fn statistics(&self) -> CrawlStatistics {
        CrawlStatistics {
            phase: self.phase,
            max_pages: self.max_pages,
            visited: self.visited.len(),
            indexed: self.index.len(),
            failed: self.failed,
            frontier: self.frontier.len(),
            in_flight: self.in_flight.len(),
            workers: self.workers,
            idle_workers: self.idle.len(),
            started_at: self.started_at,
            taken_at: Utc::now(),
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn index(&self) -> &PageIndex {
        &self.index
    }

    pub fn visited(&self) -> &HashSet<Url> {
        &self.visited
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns true if the URL is pending, in flight or visited
    pub fn is_known(&self, url: &Url) -> bool {
        self.visited.contains(url) || self.in_flight.contains_key(url) || self.frontier.contains(url)
    }

    fn transition(&mut self, next: CrawlPhase) {
        debug_assert!(self.phase.can_transition_to(next));
        tracing::info!("Coordinator phase {} -> {}", self.phase, next);
        self.phase = next;
    }

    fn record(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Success {
                url,
                final_url,
                content,
            } => {
                self.visited.insert(url.clone());
                let page = IndexedPage::new(url.clone(), final_url, content);
                let links = page.links().to_vec();
                self.index.insert(page);

                let mut merged = 0;
                for link in links {
                    if self.merge(link) {
                        merged += 1;
                    }
                }
                tracing::debug!(
                    "Indexed {} ({} new frontier entries, {} visited)",
                    url,
                    merged,
                    self.visited.len()
                );
            }
            FetchOutcome::Failure { url, reason } => {
                tracing::debug!("Fetch failed for {}: {}", url, reason);
                self.visited.insert(url);
                self.failed += 1;
            }
        }

        if self.visited.len() == self.max_pages {
            tracing::info!("Page budget of {} reached", self.max_pages);
        }
    }

    /// Adds a URL to the frontier unless it is already known
    fn merge(&mut self, url: Url) -> bool {
        if self.is_known(&url) {
            tracing::trace!("Already known: {}", url);
            return false;
        }
        self.frontier.push(url)
    }

    fn budget_remaining(&self) -> bool {
        self.visited.len() + self.in_flight.len() < self.max_pages
    }

    /// Moves the next frontier URL to `worker`, or marks the worker idle
    fn next_dispatch(&mut self, worker: WorkerId) -> Option<Dispatch> {
        let url = if self.budget_remaining() {
            self.frontier.pop()
        } else {
            None
        };

        match url {
            Some(url) => {
                self.in_flight.insert(url.clone(), worker);
                self.idle.remove(&worker);
                Some(Dispatch { worker, url })
            }
            None => {
                if self.idle.insert(worker) {
                    tracing::debug!("{} is idle", worker);
                }
                None
            }
        }
    }
}

/// Cloneable entry point into the coordinator's mailbox
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::UnboundedSender<CoordinatorMessage>,
}

impl CoordinatorHandle {
    fn send(&self, message: CoordinatorMessage) -> crate::Result<()> {
        self.sender
            .send(message)
            .map_err(|_| IndexError::CoordinatorGone)
    }

    /// Seeds the crawl; returns how many seeds were accepted
    pub async fn start_indexing(&self, seeds: Vec<String>) -> crate::Result<usize> {
        let (reply, response) = oneshot::channel();
        self.send(CoordinatorMessage::StartIndexing { seeds, reply })?;
        response.await.map_err(|_| IndexError::CoordinatorGone)?
    }

    /// Reports a finished fetch on behalf of a worker
    pub fn report(&self, worker: WorkerId, outcome: FetchOutcome) -> crate::Result<()> {
        self.send(CoordinatorMessage::FetchCompleted { worker, outcome })
    }

    /// Evaluates a query
    pub async fn query(&self, terms: QueryTerms) -> crate::Result<QueryReply> {
        let (reply, response) = oneshot::channel();
        self.send(CoordinatorMessage::Query { terms, reply })?;
        response.await.map_err(|_| IndexError::CoordinatorGone)
    }

    /// Evaluates a query from a thread outside the async runtime
    ///
    /// Must not be called from within an async task.
    pub fn query_blocking(&self, terms: QueryTerms) -> crate::Result<QueryReply> {
        let (reply, response) = oneshot::channel();
        self.send(CoordinatorMessage::Query { terms, reply })?;
        response
            .blocking_recv()
            .map_err(|_| IndexError::CoordinatorGone)
    }

    /// Ends the session; equivalent to an empty query
    pub async fn terminate(&self) -> crate::Result<()> {
        self.query(QueryTerms::terminate()).await.map(|_| ())
    }

    /// Fetches a statistics snapshot
    pub async fn statistics(&self) -> crate::Result<CrawlStatistics> {
        let (reply, response) = oneshot::channel();
        self.send(CoordinatorMessage::Statistics { reply })?;
        response.await.map_err(|_| IndexError::CoordinatorGone)
    }
}

/// Actor wrapper around `CrawlState`
pub struct Coordinator {
    state: CrawlState,
    mailbox: mpsc::UnboundedReceiver<CoordinatorMessage>,
    workers: Vec<WorkerHandle>,
}

impl Coordinator {
    /// Processes mailbox messages until the session terminates
    ///
    /// Returns the final statistics. Dropping the worker handles on return
    /// closes their request channels; in-flight fetches finish and are discarded.
    pub async fn run(mut self) -> CrawlStatistics {
        tracing::info!("Coordinator running with {} workers", self.workers.len());

        while let Some(message) = self.mailbox.recv().await {
            match message {
                CoordinatorMessage::StartIndexing { seeds, reply } => {
                    let result = self.handle_start(&seeds);
                    if reply.send(result).is_err() {
                        tracing::debug!("Start requester went away");
                    }
                }

                CoordinatorMessage::FetchCompleted { worker, outcome } => {
                    if let Some(dispatch) = self.state.on_fetch_outcome(worker, outcome) {
                        self.send_dispatch(dispatch);
                    }
                }

                CoordinatorMessage::Query { terms, reply } => {
                    let answer = self.state.on_query(&terms);
                    tracing::debug!("Query [{}] -> {:?}", terms, answer);
                    if reply.send(answer).is_err() {
                        tracing::debug!("Query requester went away");
                    }
                    if answer == QueryReply::Terminated {
                        break;
                    }
                }

                CoordinatorMessage::Statistics { reply } => {
                    if reply.send(self.state.statistics()).is_err() {
                        tracing::debug!("Statistics requester went away");
                    }
                }
            }
        }

        let stats = self.state.statistics();
        tracing::info!(
            "Coordinator stopped: {} visited, {} indexed, {} failed",
            stats.visited,
            stats.indexed,
            stats.failed
        );
        stats
    }

    fn handle_start(&mut self, seeds: &[String]) -> crate::Result<usize> {
        let (accepted, dispatches) = match self.state.start_indexing(seeds) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Rejected start request: {}", e);
                return Err(e);
            }
        };

        tracing::info!(
            "Accepted {} of {} seed URLs, dispatching {}",
            accepted,
            seeds.len(),
            dispatches.len()
        );

        for dispatch in dispatches {
            self.send_dispatch(dispatch);
        }

        Ok(accepted)
    }

    fn send_dispatch(&mut self, dispatch: Dispatch) {
        tracing::debug!("Dispatching {} to {}", dispatch.url, dispatch.worker);

        let Some(handle) = self.workers.get(dispatch.worker.0) else {
            tracing::error!("No such worker: {}", dispatch.worker);
            self.state.abandon_dispatch(&dispatch);
            return;
        };

        if let Err(e) = handle.dispatch(dispatch.url.clone()) {
            tracing::error!("Could not hand {} to {}: {}", dispatch.url, dispatch.worker, e);
            self.state.abandon_dispatch(&dispatch);
        }
    }
}

/// Spawns the coordinator task and its fetch worker pool
///
/// The pool has `config.workers` workers (at least one) that are reused for
/// the lifetime of the coordinator. A worker that finds the frontier empty
/// goes idle and is not handed later links.
///
/// # Arguments
///
/// * `config` - Supplies the page budget and the pool size
/// * `source` - Shared by every worker to retrieve pages
///
/// # Returns
///
/// * `CoordinatorHandle` - Cloneable entry point into the mailbox
/// * `JoinHandle<CrawlStatistics>` - Resolves to the final statistics once
///   the session terminates
pub fn spawn_coordinator(
    config: &CrawlerConfig,
    source: Arc<dyn PageSource>,
) -> (CoordinatorHandle, JoinHandle<CrawlStatistics>) {
    let (sender, mailbox) = mpsc::unbounded_channel();
    let handle = CoordinatorHandle { sender };

    let worker_count = config.workers.max(1);
    let workers = (0..worker_count)
        .map(|id| spawn_worker(WorkerId(id), Arc::clone(&source), handle.clone()))
        .collect();

    let coordinator = Coordinator {
        state: CrawlState::new(config.max_pages, worker_count),
        mailbox,
        workers,
    };

    (handle, tokio::spawn(coordinator.run()))
}
