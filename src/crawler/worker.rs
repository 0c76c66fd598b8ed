//! Fetch workers
//!
//! A worker owns a capacity-one request channel, so it holds at most one URL
//! at a time. It never picks up work on its own: each request comes from the
//! coordinator, usually right after the worker reported its previous one.

use crate::crawler::coordinator::CoordinatorHandle;
use crate::crawler::fetcher::{FetchedPage, PageSource};
use crate::crawler::messages::{FetchOutcome, FetchRequest, WorkerId};
use std::sync::Arc;
use tokio::sync::mpsc;
use url::Url;

/// Coordinator-side handle for sending work to one worker
#[derive(Debug)]
pub struct WorkerHandle {
    id: WorkerId,
    requests: mpsc::Sender<FetchRequest>,
}

impl WorkerHandle {
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Hands a URL to the worker without waiting
    ///
    /// Fails if the worker is still busy or has stopped.
    pub fn dispatch(&self, url: Url) -> Result<(), mpsc::error::TrySendError<FetchRequest>> {
        self.requests.try_send(FetchRequest { url })
    }
}

/// Performs one retrieval and folds any error into a failure outcome
pub async fn fetch_outcome(source: &dyn PageSource, url: Url) -> FetchOutcome {
    match source.fetch(&url).await {
        Ok(FetchedPage { final_url, content }) => FetchOutcome::Success {
            url,
            final_url,
            content,
        },
        Err(reason) => {
            tracing::warn!("Failed to fetch {}: {}", url, reason);
            FetchOutcome::Failure { url, reason }
        }
    }
}

/// Spawns a worker task and returns the handle used to feed it
pub fn spawn_worker(
    id: WorkerId,
    source: Arc<dyn PageSource>,
    coordinator: CoordinatorHandle,
) -> WorkerHandle {
    let (requests, inbox) = mpsc::channel(1);
    tokio::spawn(run_worker(id, source, inbox, coordinator));
    WorkerHandle { id, requests }
}

async fn run_worker(
    id: WorkerId,
    source: Arc<dyn PageSource>,
    mut inbox: mpsc::Receiver<FetchRequest>,
    coordinator: CoordinatorHandle,
) {
    while let Some(FetchRequest { url }) = inbox.recv().await {
        tracing::debug!("{} fetching {}", id, url);
        let outcome = fetch_outcome(source.as_ref(), url).await;

        if coordinator.report(id, outcome).is_err() {
            tracing::debug!("{} stopping: coordinator is gone", id);
            return;
        }
    }

    tracing::debug!("{} stopping: no more requests", id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FetchError;
    use async_trait::async_trait;

    struct FixedSource(Result<FetchedPage, FetchError>);

    #[async_trait]
    impl PageSource for FixedSource {
        async fn fetch(&self, _url: &Url) -> Result<FetchedPage, FetchError> {
            self.0.clone()
        }
    }

    fn url() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_outcome_success() {
        let moved = Url::parse("https://example.com/moved/").unwrap();
        let source = FixedSource(Ok(FetchedPage::new(moved.clone(), "body")));
        let outcome = fetch_outcome(&source, url()).await;
        assert_eq!(
            outcome,
            FetchOutcome::Success {
                url: url(),
                final_url: moved,
                content: "body".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_outcome_failure_is_swallowed() {
        let source = FixedSource(Err(FetchError::Timeout));
        let outcome = fetch_outcome(&source, url()).await;
        assert_eq!(
            outcome,
            FetchOutcome::Failure {
                url: url(),
                reason: FetchError::Timeout
            }
        );
    }
}
