//! Bounded worker pool for threaded command handlers.
//!
//! A fixed number of worker tasks pull jobs from one bounded queue. When the
//! queue is full, the configured [`QueueFullPolicy`] decides what happens to a
//! new submission. A panicking job is caught and logged; its worker keeps
//! running.
//!
//! ```text
//! submit ──▶ [ job | job | job | ... capacity ] ──▶ worker 0
//!                                               ──▶ worker 1
//!                                               ──▶ worker N
//! ```

use std::any::Any;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::join_all;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::SubmitError;
use crate::handler::BoxFuture;

type Job = BoxFuture<'static, ()>;

/// What to do with a submission when the queue is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueFullPolicy {
    /// Fail the submission with [`SubmitError::QueueFull`].
    Reject,
    /// Wait until a worker frees a slot.
    #[default]
    Block,
    /// Evict the oldest queued job to make room.
    DropOldest,
}

/// Worker pool settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of worker tasks.
    pub workers: usize,
    /// Maximum number of queued jobs not yet picked up by a worker.
    pub queue_capacity: usize,
    pub policy: QueueFullPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism().map_or(4, |n| n.get()),
            queue_capacity: 256,
            policy: QueueFullPolicy::Block,
        }
    }
}

struct Shared {
    queue: Mutex<VecDeque<Job>>,
    capacity: usize,
    policy: QueueFullPolicy,
    /// Signalled when a job is queued.
    ready: Notify,
    /// Signalled when a worker takes a job.
    space: Notify,
    closed: CancellationToken,
}

impl Shared {
    fn try_push(&self, job: Job) -> Result<(), Job> {
        let mut queue = self.queue.lock();
        if queue.len() >= self.capacity {
            return Err(job);
        }
        queue.push_back(job);
        drop(queue);
        self.ready.notify_one();
        Ok(())
    }

    fn push_evicting(&self, job: Job) {
        let mut queue = self.queue.lock();
        let evicted = if queue.len() >= self.capacity {
            queue.pop_front()
        } else {
            None
        };
        queue.push_back(job);
        drop(queue);
        if evicted.is_some() {
            warn!("Worker queue full, dropped the oldest queued job");
        }
        self.ready.notify_one();
    }
}

/// A fixed-size pool of tokio worker tasks with a bounded queue.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Starts the workers. Must be called from within a tokio runtime.
    pub fn start(config: PoolConfig) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::with_capacity(config.queue_capacity)),
            capacity: config.queue_capacity.max(1),
            policy: config.policy,
            ready: Notify::new(),
            space: Notify::new(),
            closed: CancellationToken::new(),
        });

        let workers = (0..config.workers.max(1))
            .map(|index| tokio::spawn(worker_loop(Arc::clone(&shared), index)))
            .collect();

        info!(
            workers = config.workers.max(1),
            capacity = shared.capacity,
            policy = ?config.policy,
            "Worker pool started"
        );

        Self {
            shared,
            workers: Mutex::new(workers),
        }
    }

    pub fn policy(&self) -> QueueFullPolicy {
        self.shared.policy
    }

    /// Number of jobs waiting for a worker.
    pub fn queued(&self) -> usize {
        self.shared.queue.lock().len()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.is_cancelled()
    }

    /// Queues a job according to the pool's policy.
    ///
    /// With [`QueueFullPolicy::Block`] this waits for a free slot.
    pub async fn submit<F>(&self, job: F) -> Result<(), SubmitError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut job: Job = Box::pin(job);
        if self.shared.policy != QueueFullPolicy::Block {
            return self.enqueue(job);
        }

        loop {
            if self.is_closed() {
                return Err(SubmitError::ShutDown);
            }

            let space = self.shared.space.notified();
            tokio::pin!(space);
            space.as_mut().enable();

            match self.shared.try_push(job) {
                Ok(()) => return Ok(()),
                Err(rejected) => job = rejected,
            }

            tokio::select! {
                () = &mut space => {}
                () = self.shared.closed.cancelled() => return Err(SubmitError::ShutDown),
            }
        }
    }

    /// Queues a job without waiting.
    ///
    /// A full queue fails with [`SubmitError::QueueFull`] unless the policy is
    /// [`QueueFullPolicy::DropOldest`].
    pub fn try_submit<F>(&self, job: F) -> Result<(), SubmitError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.enqueue(Box::pin(job))
    }

    fn enqueue(&self, job: Job) -> Result<(), SubmitError> {
        if self.is_closed() {
            return Err(SubmitError::ShutDown);
        }
        match self.shared.policy {
            QueueFullPolicy::DropOldest => {
                self.shared.push_evicting(job);
                Ok(())
            }
            QueueFullPolicy::Reject | QueueFullPolicy::Block => self
                .shared
                .try_push(job)
                .map_err(|_| SubmitError::QueueFull),
        }
    }

    /// Stops accepting jobs, lets the workers drain the queue and waits up to
    /// `grace` for them to finish.
    ///
    /// Returns `false` if the grace period ran out; remaining workers are
    /// aborted.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.shared.closed.cancel();
        self.shared.space.notify_waiters();

        let workers: Vec<_> = std::mem::take(&mut *self.workers.lock());
        let aborts: Vec<_> = workers.iter().map(JoinHandle::abort_handle).collect();

        match tokio::time::timeout(grace, join_all(workers)).await {
            Ok(_) => {
                info!("Worker pool drained");
                true
            }
            Err(_) => {
                warn!(
                    queued = self.queued(),
                    "Worker pool did not drain within {grace:?}, aborting workers"
                );
                for handle in aborts {
                    handle.abort();
                }
                false
            }
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("capacity", &self.shared.capacity)
            .field("policy", &self.shared.policy)
            .field("queued", &self.queued())
            .finish()
    }
}

async fn worker_loop(shared: Arc<Shared>, index: usize) {
    loop {
        let job = shared.queue.lock().pop_front();
        match job {
            Some(job) => {
                shared.space.notify_one();
                if let Err(panic) = AssertUnwindSafe(job).catch_unwind().await {
                    error!(
                        worker = index,
                        "Threaded handler panicked: {}",
                        panic_message(&*panic)
                    );
                }
            }
            None if shared.closed.is_cancelled() => break,
            None => {
                tokio::select! {
                    () = shared.ready.notified() => {}
                    () = shared.closed.cancelled() => {}
                }
            }
        }
    }
    debug!(worker = index, "Worker stopped");
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    fn config(workers: usize, queue_capacity: usize, policy: QueueFullPolicy) -> PoolConfig {
        PoolConfig {
            workers,
            queue_capacity,
            policy,
        }
    }

    /// Occupies the single worker until the returned sender fires.
    async fn block_worker(pool: &WorkerPool) -> oneshot::Sender<()> {
        let (release, wait) = oneshot::channel::<()>();
        let (started_tx, started_rx) = oneshot::channel::<()>();
        pool.submit(async move {
            let _ = started_tx.send(());
            let _ = wait.await;
        })
        .await
        .unwrap();
        started_rx.await.unwrap();
        release
    }

    #[tokio::test]
    async fn test_runs_jobs() {
        let pool = WorkerPool::start(config(2, 8, QueueFullPolicy::Block));
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let c = Arc::clone(&count);
            pool.submit(async move {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();
        }

        assert!(pool.shutdown(Duration::from_secs(5)).await);
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_reject_when_full() {
        let pool = WorkerPool::start(config(1, 1, QueueFullPolicy::Reject));
        let release = block_worker(&pool).await;

        pool.try_submit(async {}).unwrap();
        assert_eq!(pool.try_submit(async {}), Err(SubmitError::QueueFull));

        let _ = release.send(());
        assert!(pool.shutdown(Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn test_drop_oldest_evicts() {
        let pool = WorkerPool::start(config(1, 1, QueueFullPolicy::DropOldest));
        let release = block_worker(&pool).await;
        let ran = Arc::new(Mutex::new(Vec::new()));

        for id in [1, 2] {
            let ran = Arc::clone(&ran);
            pool.try_submit(async move { ran.lock().push(id) }).unwrap();
        }
        assert_eq!(pool.queued(), 1);

        let _ = release.send(());
        assert!(pool.shutdown(Duration::from_secs(5)).await);
        assert_eq!(*ran.lock(), vec![2]);
    }

    #[tokio::test]
    async fn test_block_waits_for_space() {
        let pool = Arc::new(WorkerPool::start(config(1, 1, QueueFullPolicy::Block)));
        let release = block_worker(&pool).await;
        pool.submit(async {}).await.unwrap();

        let blocked = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { pool.submit(async {}).await })
        };
        tokio::task::yield_now().await;
        assert!(!blocked.is_finished());

        let _ = release.send(());
        assert_eq!(blocked.await.unwrap(), Ok(()));
        assert!(pool.shutdown(Duration::from_secs(5)).await);
    }

    async fn explode() {
        panic!("boom");
    }

    #[tokio::test]
    async fn test_panic_does_not_kill_worker() {
        let pool = WorkerPool::start(config(1, 4, QueueFullPolicy::Block));
        let count = Arc::new(AtomicUsize::new(0));

        pool.submit(explode()).await.unwrap();
        let c = Arc::clone(&count);
        pool.submit(async move {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

        assert!(pool.shutdown(Duration::from_secs(5)).await);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submit_after_shutdown() {
        let pool = WorkerPool::start(config(1, 1, QueueFullPolicy::Reject));
        assert!(pool.shutdown(Duration::from_secs(1)).await);
        assert_eq!(pool.try_submit(async {}), Err(SubmitError::ShutDown));
        assert_eq!(pool.submit(async {}).await, Err(SubmitError::ShutDown));
    }

    #[tokio::test]
    async fn test_shutdown_times_out() {
        let pool = WorkerPool::start(config(1, 1, QueueFullPolicy::Block));
        pool.submit(std::future::pending::<()>()).await.unwrap();
        assert!(!pool.shutdown(Duration::from_millis(50)).await);
    }
}
