//! Fixed-size worker pool over a FIFO queue.
//!
//! # Responsibilities
//! - Spawn exactly `size` workers at startup
//! - Queue tasks in dispatch order on a bounded channel
//! - Run each task to completion on whichever worker takes it next
//!
//! # Design Decisions
//! - Workers share one receiver behind an async mutex; the lock is held
//!   only while waiting for the next task, never while running one
//! - A full queue makes `dispatch` wait, which is how the accept loop
//!   feels backpressure
//! - No stealing, priorities or cancellation

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// The pool no longer accepts tasks.
#[derive(Debug, Error)]
#[error("worker pool is closed")]
pub struct PoolClosed;

/// A fixed set of workers consuming tasks of type `T`.
#[derive(Debug)]
pub struct WorkerPool<T> {
    tx: Option<mpsc::Sender<T>>,
    workers: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Spawn `size` workers. Each calls `handler(worker_index, task)` for
    /// every task it takes and awaits it before taking the next.
    pub fn spawn<F, Fut>(size: usize, queue_depth: usize, handler: F) -> Self
    where
        F: Fn(usize, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(queue_depth.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let handler = Arc::new(handler);

        let workers = (0..size)
            .map(|worker| {
                let rx = Arc::clone(&rx);
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    loop {
                        let next = rx.lock().await.recv().await;
                        match next {
                            Some(task) => handler(worker, task).await,
                            None => break,
                        }
                    }
                    tracing::trace!(worker, "Worker exiting");
                })
            })
            .collect();

        tracing::debug!(size, queue_depth, "Worker pool started");
        Self {
            tx: Some(tx),
            workers,
        }
    }

    /// Queue a task, waiting while the queue is full.
    pub async fn dispatch(&self, task: T) -> Result<(), PoolClosed> {
        let tx = self.tx.as_ref().ok_or(PoolClosed)?;
        tx.send(task).await.map_err(|_| PoolClosed)
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Stop accepting tasks. Queued tasks still run.
    pub fn close(&mut self) {
        self.tx = None;
    }

    /// Close the queue and wait for every worker to drain it and exit.
    pub async fn join(mut self) {
        self.close();
        for worker in self.workers.drain(..) {
            match worker.await {
                Err(e) if e.is_cancelled() => {}
                Err(e) => tracing::error!(error = %e, "Worker task failed"),
                Ok(()) => {}
            }
        }
    }

    /// Abort every worker, including ones mid-task.
    pub fn abort(&self) {
        for worker in &self.workers {
            worker.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn runs_every_task() {
        let done = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&done);
        let pool = WorkerPool::spawn(3, 4, move |_, n: usize| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(n, Ordering::SeqCst);
            }
        });
        assert_eq!(pool.size(), 3);

        for n in 1..=10 {
            pool.dispatch(n).await.unwrap();
        }
        pool.join().await;
        assert_eq!(done.load(Ordering::SeqCst), 55);
    }

    #[tokio::test]
    async fn never_exceeds_pool_size() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (r, p) = (Arc::clone(&running), Arc::clone(&peak));

        let pool = WorkerPool::spawn(2, 8, move |_, _: ()| {
            let (running, peak) = (Arc::clone(&r), Arc::clone(&p));
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            }
        });

        for _ in 0..8 {
            pool.dispatch(()).await.unwrap();
        }
        pool.join().await;
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn single_worker_preserves_fifo_order() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let pool = WorkerPool::spawn(1, 16, move |_, n: u32| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(n);
            }
        });

        for n in 0..10 {
            pool.dispatch(n).await.unwrap();
        }
        pool.join().await;
        assert_eq!(*seen.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn dispatch_after_close_fails() {
        let mut pool = WorkerPool::spawn(1, 1, |_, _: ()| async {});
        pool.close();
        assert!(pool.dispatch(()).await.is_err());
        pool.join().await;
    }

    #[tokio::test]
    async fn full_queue_blocks_dispatch() {
        let (release_tx, release_rx) = tokio::sync::watch::channel(false);
        let pool = WorkerPool::spawn(1, 1, move |_, _: ()| {
            let mut release = release_rx.clone();
            async move {
                while !*release.borrow() {
                    if release.changed().await.is_err() {
                        break;
                    }
                }
            }
        });

        // One task running, one queued; the third must wait.
        pool.dispatch(()).await.unwrap();
        pool.dispatch(()).await.unwrap();
        let blocked = tokio::time::timeout(Duration::from_millis(100), pool.dispatch(())).await;
        assert!(blocked.is_err());

        release_tx.send(true).unwrap();
        pool.dispatch(()).await.unwrap();
        pool.join().await;
    }
}
