//! Readers-writer admission for one store.
//!
//! Jobs are queued in submission order and admitted by a single dispatcher
//! task. Each admission takes a fair `tokio` [`RwLock`]: shared for reads,
//! exclusive for writes. The guard travels with the job onto the blocking
//! pool and is released only when the job returns, so an exclusive job is
//! fully finished before anything submitted after it starts.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Kind of access a job needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Runs alongside other shared jobs.
    Shared,
    /// Runs with nothing else in flight.
    Exclusive,
}

struct Ticket {
    access: Access,
    job: Job,
}

/// Handle for submitting jobs to a store's dispatcher.
///
/// Cloning yields another handle onto the same queue. The dispatcher exits
/// once every handle is dropped and the queue has drained.
#[derive(Clone)]
pub struct Gate {
    queue: mpsc::UnboundedSender<Ticket>,
}

impl Gate {
    /// Start a dispatcher on `handle` and return a gate feeding it.
    pub fn new(handle: &Handle, label: &str) -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        let lock = Arc::new(RwLock::new(()));
        let label = label.to_string();
        handle.spawn(async move {
            dispatch(rx, lock).await;
            debug!(store = %label, "gate dispatcher stopped");
        });
        Self { queue }
    }

    /// Schedule `job` to run concurrently with other reads, after every
    /// exclusive job submitted before it has finished.
    pub fn run_read<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Access::Shared, Box::new(job));
    }

    /// Schedule `job` to run with no other job in flight.
    pub fn run_exclusive<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Access::Exclusive, Box::new(job));
    }

    fn submit(&self, access: Access, job: Job) {
        // A closed queue means the runtime is gone. Dropping the job drops
        // its completion sender, which the waiting side observes.
        if self.queue.send(Ticket { access, job }).is_err() {
            warn!(?access, "gate dispatcher is gone; job dropped");
        }
    }
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate")
            .field("closed", &self.queue.is_closed())
            .finish()
    }
}

async fn dispatch(mut rx: mpsc::UnboundedReceiver<Ticket>, lock: Arc<RwLock<()>>) {
    while let Some(Ticket { access, job }) = rx.recv().await {
        match access {
            Access::Shared => {
                let guard = Arc::clone(&lock).read_owned().await;
                tokio::task::spawn_blocking(move || {
                    job();
                    drop(guard);
                });
            }
            Access::Exclusive => {
                let guard = Arc::clone(&lock).write_owned().await;
                tokio::task::spawn_blocking(move || {
                    job();
                    drop(guard);
                });
            }
        }
    }
}
