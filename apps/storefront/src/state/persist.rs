//! # Persistence Worker
//!
//! Fire-and-forget writes from commands to the [`Store`].
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Background Persistence                            │
//! │                                                                         │
//! │  Command (lock held)                                                   │
//! │    mutate in-memory collections                                        │
//! │    collect Vec<PersistJob>                                             │
//! │  Command (lock released)                                               │
//! │    persister.enqueue(job) ──► bounded mpsc ──► worker task             │
//! │                                                   │                     │
//! │                                                   ▼                     │
//! │                                         store.upsert_*(..)             │
//! │                                           │ Err (transient)            │
//! │                                           ▼                             │
//! │                                 sleep(ExponentialBackoff)              │
//! │                                 retry, at most max_retries times       │
//! │                                           │ still failing              │
//! │                                           ▼                             │
//! │                                 tracing::error!, job dropped            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Local state is never rolled back when a write fails. Jobs are written one
//! at a time in the order they were queued.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::config::PersistenceSettings;
use loom_core::{Client, Expense, Order, Product, SearchLog};
use loom_db::{DbResult, Store};

/// One write for the store.
#[derive(Debug, Clone)]
pub enum PersistJob {
    UpsertProduct(Product),
    UpsertOrder(Order),
    UpsertClient(Client),
    CreateExpense(Expense),
    CreateSearchLog(SearchLog),
}

impl PersistJob {
    /// Entity kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PersistJob::UpsertProduct(_) => "product",
            PersistJob::UpsertOrder(_) => "order",
            PersistJob::UpsertClient(_) => "client",
            PersistJob::CreateExpense(_) => "expense",
            PersistJob::CreateSearchLog(_) => "search_log",
        }
    }

    /// Id of the record being written.
    pub fn entity_id(&self) -> &str {
        match self {
            PersistJob::UpsertProduct(p) => &p.id,
            PersistJob::UpsertOrder(o) => &o.id,
            PersistJob::UpsertClient(c) => &c.id,
            PersistJob::CreateExpense(e) => &e.id,
            PersistJob::CreateSearchLog(l) => &l.id,
        }
    }

    async fn apply(&self, store: &dyn Store) -> DbResult<()> {
        match self {
            PersistJob::UpsertProduct(p) => store.upsert_product(p).await,
            PersistJob::UpsertOrder(o) => store.upsert_order(o).await,
            PersistJob::UpsertClient(c) => store.upsert_client(c).await,
            PersistJob::CreateExpense(e) => store.create_expense(e).await,
            PersistJob::CreateSearchLog(l) => store.create_search_log(l).await,
        }
    }
}

enum Message {
    Job(PersistJob),
    /// Answered once every job queued before it has been handled.
    Flush(oneshot::Sender<()>),
}

/// Retry policy for one job.
#[derive(Debug, Clone)]
struct RetryPolicy {
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None, // bounded by max_retries instead
            ..Default::default()
        }
    }
}

/// Handle to the background writer. Dropping it stops the worker once the
/// queue is drained.
#[derive(Debug)]
pub struct Persister {
    tx: mpsc::Sender<Message>,
    failed: Arc<AtomicUsize>,
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Job(job) => write!(f, "Job({} {})", job.kind(), job.entity_id()),
            Message::Flush(_) => f.write_str("Flush"),
        }
    }
}

impl Persister {
    /// Spawns the worker on the current Tokio runtime.
    pub fn spawn(store: Arc<dyn Store>, settings: &PersistenceSettings) -> Self {
        let (tx, rx) = mpsc::channel(settings.queue_capacity.max(1));
        let failed = Arc::new(AtomicUsize::new(0));
        let policy = RetryPolicy {
            max_retries: settings.max_retries,
            initial_backoff: settings.initial_backoff(),
            max_backoff: settings.max_backoff(),
        };

        tokio::spawn(run_worker(store, rx, policy, Arc::clone(&failed)));

        info!(
            queue_capacity = settings.queue_capacity,
            max_retries = settings.max_retries,
            "Persistence worker started"
        );

        Persister { tx, failed }
    }

    /// Queues a write. Waits only when the queue is full.
    pub async fn enqueue(&self, job: PersistJob) {
        let (kind, id) = (job.kind(), job.entity_id().to_string());
        if self.tx.send(Message::Job(job)).await.is_err() {
            error!(kind, id = %id, "Persistence worker stopped, write dropped");
        }
    }

    /// Queues several writes in order.
    pub async fn enqueue_all(&self, jobs: impl IntoIterator<Item = PersistJob>) {
        for job in jobs {
            self.enqueue(job).await;
        }
    }

    /// Waits until every write queued so far has succeeded or given up.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Message::Flush(done_tx)).await.is_err() {
            return;
        }
        let _ = done_rx.await;
    }

    /// Writes that were dropped after exhausting their retries.
    pub fn failed_writes(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }
}

async fn run_worker(
    store: Arc<dyn Store>,
    mut rx: mpsc::Receiver<Message>,
    policy: RetryPolicy,
    failed: Arc<AtomicUsize>,
) {
    while let Some(message) = rx.recv().await {
        match message {
            Message::Job(job) => {
                if let Err(e) = write_with_retry(store.as_ref(), &job, &policy).await {
                    failed.fetch_add(1, Ordering::SeqCst);
                    error!(
                        kind = job.kind(),
                        id = %job.entity_id(),
                        error = %e,
                        "Giving up on write, local state kept"
                    );
                }
            }
            Message::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    debug!("Persistence worker stopped");
}

async fn write_with_retry(store: &dyn Store, job: &PersistJob, policy: &RetryPolicy) -> DbResult<()> {
    let mut backoff = policy.backoff();
    let mut retries = 0u32;

    loop {
        match job.apply(store).await {
            Ok(()) => {
                debug!(kind = job.kind(), id = %job.entity_id(), retries, "Write persisted");
                return Ok(());
            }
            Err(e) if !e.is_transient() || retries >= policy.max_retries => return Err(e),
            Err(e) => {
                retries += 1;
                let delay = backoff.next_backoff().unwrap_or(policy.max_backoff);
                warn!(
                    kind = job.kind(),
                    id = %job.entity_id(),
                    attempt = retries,
                    ?delay,
                    error = %e,
                    "Write failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
