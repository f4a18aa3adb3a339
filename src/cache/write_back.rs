//! Background Write-Back Queue
//!
//! Cache writes triggered by requests are handed to this queue instead of
//! being awaited. A single worker task drains it against the shared store.
//!
//! ## Guarantees
//! - `enqueue` never waits: when the queue is full the job is dropped and logged.
//! - A failed write is logged and discarded; it is never reported back to the
//!   request that produced it.
//! - Jobs are independent of the request that queued them, so a caller
//!   disconnecting does not cancel its write-back.
//! - Each write is bounded by a timeout; a write that runs out of time counts
//!   as failed, so a hung cache cannot stall the worker.
//! - `shutdown` stops intake and waits for buffered jobs to be applied, up to
//!   a deadline. Whatever is still pending then is abandoned.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex, Notify};
use tokio::task::JoinHandle;

use super::store::CacheStore;
use crate::error::{GatewayError, Result};

/// Upper bound on a single cache write.
pub const APPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// How long `shutdown` waits for buffered writes.
pub const DRAIN_DEADLINE: Duration = Duration::from_secs(5);

/// One deferred cache mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteBackJob {
    Set {
        key: String,
        value: String,
        ttl: Duration,
    },
    IncrSorted {
        set: String,
        member: String,
    },
}

/// Counters describing what the worker has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteBackStats {
    pub applied: u64,
    pub failed: u64,
    pub dropped: u64,
}

#[derive(Default)]
struct Counters {
    applied: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

pub struct WriteBackQueue {
    sender: mpsc::Sender<WriteBackJob>,
    shutdown: Arc<Notify>,
    worker: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<Counters>,
}

impl WriteBackQueue {
    /// Spawns the worker on the current runtime and returns the queue handle.
    pub fn start(store: Arc<dyn CacheStore>, capacity: usize) -> Arc<Self> {
        Self::start_with_apply_timeout(store, capacity, APPLY_TIMEOUT)
    }

    pub fn start_with_apply_timeout(
        store: Arc<dyn CacheStore>,
        capacity: usize,
        apply_timeout: Duration,
    ) -> Arc<Self> {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let shutdown = Arc::new(Notify::new());
        let counters = Arc::new(Counters::default());

        let worker = tokio::spawn(Self::worker_loop(
            store,
            receiver,
            shutdown.clone(),
            counters.clone(),
            apply_timeout,
        ));

        tracing::info!("Cache write-back worker started (capacity {})", capacity);

        Arc::new(Self {
            sender,
            shutdown,
            worker: Mutex::new(Some(worker)),
            counters,
        })
    }

    /// Queues a job without waiting. Returns `false` if it was dropped.
    pub fn enqueue(&self, job: WriteBackJob) -> bool {
        match self.sender.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Write-back queue full, dropping {}", describe(&job));
                false
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Write-back queue closed, dropping {}", describe(&job));
                false
            }
        }
    }

    pub fn stats(&self) -> WriteBackStats {
        WriteBackStats {
            applied: self.counters.applied.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }

    /// Stops accepting jobs and waits up to [`DRAIN_DEADLINE`] for the
    /// buffered ones to be applied. Calling it more than once is harmless.
    pub async fn shutdown(&self) {
        self.shutdown_within(DRAIN_DEADLINE).await;
    }

    /// Like [`shutdown`](Self::shutdown) with an explicit deadline. Returns
    /// `false` if the deadline passed and pending writes were abandoned.
    pub async fn shutdown_within(&self, deadline: Duration) -> bool {
        let Some(mut worker) = self.worker.lock().await.take() else {
            return true;
        };

        self.shutdown.notify_one();
        let drained = match tokio::time::timeout(deadline, &mut worker).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!("Write-back worker terminated abnormally: {}", e);
                true
            }
            Err(_) => {
                worker.abort();
                tracing::warn!(
                    "Write-back drain exceeded {:?}, abandoning pending writes",
                    deadline
                );
                false
            }
        };

        let stats = self.stats();
        tracing::info!(
            "Write-back queue drained: {} applied, {} failed, {} dropped",
            stats.applied,
            stats.failed,
            stats.dropped
        );
        drained
    }

    async fn worker_loop(
        store: Arc<dyn CacheStore>,
        mut receiver: mpsc::Receiver<WriteBackJob>,
        shutdown: Arc<Notify>,
        counters: Arc<Counters>,
        apply_timeout: Duration,
    ) {
        loop {
            tokio::select! {
                job = receiver.recv() => match job {
                    Some(job) => Self::apply(store.as_ref(), job, &counters, apply_timeout).await,
                    None => break,
                },
                _ = shutdown.notified() => {
                    receiver.close();
                    while let Some(job) = receiver.recv().await {
                        Self::apply(store.as_ref(), job, &counters, apply_timeout).await;
                    }
                    break;
                }
            }
        }

        tracing::debug!("Write-back worker stopped");
    }

    async fn apply(
        store: &dyn CacheStore,
        job: WriteBackJob,
        counters: &Counters,
        apply_timeout: Duration,
    ) {
        let write = async {
            match &job {
                WriteBackJob::Set { key, value, ttl } => store.set(key, value, *ttl).await,
                WriteBackJob::IncrSorted { set, member } => {
                    store.incr_sorted(set, member, 1.0).await
                }
            }
        };
        let result: Result<()> = match tokio::time::timeout(apply_timeout, write).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Cache(format!(
                "write timed out after {:?}",
                apply_timeout
            ))),
        };

        match result {
            Ok(()) => {
                counters.applied.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("Applied {}", describe(&job));
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Cache write-back failed for {}: {}", describe(&job), e);
            }
        }
    }
}

fn describe(job: &WriteBackJob) -> String {
    match job {
        WriteBackJob::Set { key, .. } => format!("set {}", key),
        WriteBackJob::IncrSorted { set, member } => format!("incr {}[{}]", set, member),
    }
}
