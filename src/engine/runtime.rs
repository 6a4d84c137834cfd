//! Pooled matching runtime.
//!
//! Scoring one query against a corpus is independent of every other query, so
//! a roster can be matched on several threads at once. This module provides a
//! small, bounded, thread-based pool that shares one read-only engine between
//! workers and hands each result back on its own reply channel.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{debug, warn};

use crate::engine::{MatchEngine, Matcher};
use crate::error::{ExecutionError, ResolveError, ResolveResult};
use crate::ranker::MatchResult;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Maximum queued queries.
    pub queue_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 1024,
        }
    }
}

enum Job {
    Match {
        query: String,
        top_n: usize,
        reply: Sender<MatchResult>,
    },

    #[cfg(test)]
    Sleep {
        duration: Duration,
        reply: Sender<()>,
    },
}

struct WorkerPool {
    tx: Sender<Job>,
    workers: Vec<JoinHandle<()>>,
    queue_capacity: usize,
}

impl WorkerPool {
    fn start(workers: usize, queue_capacity: usize, engine: &Arc<MatchEngine>) -> Result<Self, ExecutionError> {
        let workers = workers.max(1);
        let queue_capacity = queue_capacity.max(1);
        let (tx, rx) = bounded::<Job>(queue_capacity);

        let mut pool = Self {
            tx,
            workers: Vec::with_capacity(workers),
            queue_capacity,
        };

        for idx in 0..workers {
            let rx: Receiver<Job> = rx.clone();
            let engine = Arc::clone(engine);
            let thread_name = format!("contact-resolve-match-{idx}");
            let spawned = thread::Builder::new()
                .name(thread_name.clone())
                .spawn(move || loop {
                    match rx.recv() {
                        Ok(Job::Match { query, top_n, reply }) => {
                            let result = engine.find_matches(&query, top_n);
                            let _ = reply.send(result);
                        }
                        Err(_) => break,

                        #[cfg(test)]
                        Ok(Job::Sleep { duration, reply }) => {
                            thread::sleep(duration);
                            let _ = reply.send(());
                        }
                    }
                });
            match spawned {
                Ok(handle) => pool.workers.push(handle),
                Err(e) => {
                    // Join whatever already started before reporting.
                    pool.shutdown();
                    return Err(ExecutionError::WorkerSpawn {
                        name: thread_name,
                        message: e.to_string(),
                    });
                }
            }
        }

        debug!(workers, queue_capacity, "match runtime started");
        Ok(pool)
    }

    fn try_submit(&self, job: Job) -> Result<(), ExecutionError> {
        match self.tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!(capacity = self.queue_capacity, "match queue full");
                Err(ExecutionError::QueueFull {
                    capacity: self.queue_capacity,
                })
            }
            Err(TrySendError::Disconnected(_)) => Err(ExecutionError::Disconnected),
        }
    }

    fn shutdown(self) {
        // Close the channel: workers will drain queued jobs then exit.
        drop(self.tx);
        for handle in self.workers {
            let _ = handle.join();
        }
    }
}

/// Handle returned by [`MatchRuntime::submit`].
pub struct MatchHandle {
    rx: Receiver<MatchResult>,
}

impl MatchHandle {
    /// Waits for the result.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::Disconnected` if the worker went away.
    pub fn join(self) -> ResolveResult<MatchResult> {
        self.rx
            .recv()
            .map_err(|_| ResolveError::Execution(ExecutionError::Disconnected))
    }

    /// Waits for the result, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::Disconnected` if the worker went away. A plain
    /// timeout is `Ok(None)`.
    pub fn join_timeout(self, timeout: Duration) -> Result<Option<MatchResult>, ResolveError> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Ok(Some(result)),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => Ok(None),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                Err(ResolveError::Execution(ExecutionError::Disconnected))
            }
        }
    }
}

/// A worker pool answering queries against one shared engine.
///
/// Results are identical to calling [`MatchEngine::find_matches`] directly;
/// only the thread doing the work differs.
pub struct MatchRuntime {
    engine: Arc<MatchEngine>,
    pool: Option<WorkerPool>,
}

impl MatchRuntime {
    /// Starts a runtime over a loaded engine.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::WorkerSpawn` if a worker thread cannot be started.
    pub fn new(engine: MatchEngine, config: &RuntimeConfig) -> ResolveResult<Self> {
        let engine = Arc::new(engine);
        let pool = WorkerPool::start(config.workers, config.queue_capacity, &engine)?;
        Ok(Self {
            engine,
            pool: Some(pool),
        })
    }

    fn pool(&self) -> Result<&WorkerPool, ExecutionError> {
        self.pool.as_ref().ok_or(ExecutionError::Disconnected)
    }

    /// Queues a query.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::QueueFull` when the queue is at capacity; the
    /// query can be resubmitted later.
    pub fn submit(&self, query: impl Into<String>, top_n: usize) -> ResolveResult<MatchHandle> {
        let (tx, rx) = bounded::<MatchResult>(1);
        let job = Job::Match {
            query: query.into(),
            top_n,
            reply: tx,
        };
        self.pool()?.try_submit(job)?;
        Ok(MatchHandle { rx })
    }

    /// Matches every query and returns results in the same order.
    ///
    /// Submits in batches no larger than the queue so a long roster never
    /// overflows it.
    ///
    /// # Errors
    ///
    /// Returns the first execution error encountered.
    pub fn match_all<I, S>(&self, queries: I, top_n: usize) -> ResolveResult<Vec<MatchResult>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let batch = self.pool()?.queue_capacity;
        let mut results = Vec::new();
        let mut pending: Vec<MatchHandle> = Vec::with_capacity(batch);

        for query in queries {
            if pending.len() == batch {
                for handle in pending.drain(..) {
                    results.push(handle.join()?);
                }
            }
            pending.push(self.submit(query, top_n)?);
        }
        for handle in pending {
            results.push(handle.join()?);
        }
        Ok(results)
    }

    /// Returns a shared reference to the underlying engine.
    #[must_use]
    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    #[cfg(test)]
    fn submit_sleep(&self, duration: Duration) -> ResolveResult<Receiver<()>> {
        let (tx, rx) = bounded::<()>(1);
        self.pool()?.try_submit(Job::Sleep { duration, reply: tx })?;
        Ok(rx)
    }
}

impl Matcher for MatchRuntime {
    fn find_matches(&self, query: &str, top_n: usize) -> ResolveResult<MatchResult> {
        self.submit(query, top_n)?.join()
    }
}

impl Drop for MatchRuntime {
    fn drop(&mut self) {
        // Deterministic shutdown: stop workers and join threads.
        if let Some(pool) = self.pool.take() {
            pool.shutdown();
        }
    }
}
