//! Bounded-concurrency batch dispatch against the render backend.

use hokusai_core::{RenderRequest, RenderTarget};
use hokusai_error::{BatchError, BatchErrorKind, HokusaiResult};
use hokusai_interface::RenderDriver;
use hokusai_storage::PageStore;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Per-item outcomes of one batch run, in submission order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Targets that rendered, with their committed artifact locations
    pub succeeded: Vec<(RenderTarget, String)>,
    /// Targets that did not render, with human-readable reasons
    pub failed: Vec<(RenderTarget, String)>,
    /// How many requests were dispatched
    pub total_attempted: usize,
}

impl BatchResult {
    /// True when every dispatched request succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Cooperative cancellation handle for a running batch.
///
/// Cancellation is best-effort: calls already in flight run to completion and
/// their results are still reported, but no new calls are dispatched once the
/// flag is observed.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A fresh, uncancelled flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

enum Outcome {
    Succeeded(String),
    Failed(String),
}

/// Dispatches render requests with a bounded number of calls in flight.
///
/// Each request is attempted exactly once; re-running failed items is a
/// caller decision, since render failures are often rate limits that benefit
/// from caller-controlled backoff. A failure never cancels or blocks other
/// requests. Successful renders are committed to the page store before being
/// reported.
pub struct BatchOrchestrator {
    driver: Arc<dyn RenderDriver>,
    store: Arc<PageStore>,
    call_timeout: Duration,
}

impl BatchOrchestrator {
    /// An orchestrator dispatching against the given driver and committing
    /// artifacts to the given store.
    pub fn new(driver: Arc<dyn RenderDriver>, store: Arc<PageStore>, call_timeout: Duration) -> Self {
        Self {
            driver,
            store,
            call_timeout,
        }
    }

    /// Run a batch to completion with at most `limit` calls in flight.
    pub async fn run(
        &self,
        requests: Vec<RenderRequest>,
        limit: usize,
    ) -> HokusaiResult<BatchResult> {
        self.run_with_cancel(requests, limit, CancelFlag::new()).await
    }

    /// Run a batch, observing a caller-held cancellation flag between
    /// dispatches.
    #[tracing::instrument(skip(self, requests, cancel), fields(requests = requests.len(), limit))]
    pub async fn run_with_cancel(
        &self,
        requests: Vec<RenderRequest>,
        limit: usize,
        cancel: CancelFlag,
    ) -> HokusaiResult<BatchResult> {
        if limit == 0 {
            return Err(BatchError::new(BatchErrorKind::InvalidConcurrencyLimit(limit)).into());
        }

        let total = requests.len();
        let semaphore = Arc::new(Semaphore::new(limit));
        let mut join_set: JoinSet<(usize, Outcome)> = JoinSet::new();
        let mut outcomes: Vec<Option<Outcome>> = Vec::new();
        outcomes.resize_with(total, || None);
        let targets: Vec<RenderTarget> = requests.iter().map(|r| r.target).collect();
        let mut dispatched = 0;

        for (index, request) in requests.into_iter().enumerate() {
            if cancel.is_cancelled() {
                outcomes[index] = Some(Outcome::Failed("cancelled before dispatch".to_string()));
                continue;
            }

            // Waiting here, not in the task, keeps dispatch ordered and lets
            // cancellation stop the queue between permits.
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .expect("semaphore is never closed");

            if cancel.is_cancelled() {
                outcomes[index] = Some(Outcome::Failed("cancelled before dispatch".to_string()));
                continue;
            }

            dispatched += 1;
            let driver = self.driver.clone();
            let store = self.store.clone();
            let call_timeout = self.call_timeout;
            join_set.spawn(async move {
                let _permit = permit;
                let outcome = render_one(&*driver, &*store, &request, call_timeout).await;
                (index, outcome)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => tracing::error!("render task failed to join: {e}"),
            }
        }

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for (index, outcome) in outcomes.into_iter().enumerate() {
            let target = targets[index];
            match outcome {
                Some(Outcome::Succeeded(location)) => succeeded.push((target, location)),
                Some(Outcome::Failed(reason)) => failed.push((target, reason)),
                None => failed.push((target, "render task aborted".to_string())),
            }
        }

        tracing::info!(
            dispatched,
            succeeded = succeeded.len(),
            failed = failed.len(),
            "batch complete"
        );
        Ok(BatchResult {
            succeeded,
            failed,
            total_attempted: dispatched,
        })
    }
}

async fn render_one(
    driver: &dyn RenderDriver,
    store: &PageStore,
    request: &RenderRequest,
    call_timeout: Duration,
) -> Outcome {
    let references: Vec<String> = request
        .reference_artifacts()
        .map(str::to_string)
        .collect();

    let rendered = tokio::time::timeout(
        call_timeout,
        driver.render(
            &request.instruction,
            &references,
            request.size_hint,
            request.aspect_ratio,
        ),
    )
    .await;

    let bytes = match rendered {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            tracing::warn!(target = %request.target, "render failed: {e}");
            return Outcome::Failed(e.to_string());
        }
        Err(_) => {
            tracing::warn!(target = %request.target, "render timed out");
            return Outcome::Failed(format!(
                "timed out after {} seconds",
                call_timeout.as_secs()
            ));
        }
    };

    match store.set_rendered(request.target, &bytes).await {
        Ok(location) => Outcome::Succeeded(location),
        Err(e) => Outcome::Failed(format!("artifact commit failed: {e}")),
    }
}
