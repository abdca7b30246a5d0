//! Bounded concurrent fan-out/fan-in.
//!
//! [`map_unordered`] pulls items from a (possibly lazy) input sequence and
//! runs an async transform over up to N of them at once. Outputs arrive in
//! completion order, not input order. Admission blocks once the in-flight
//! ceiling (~1.25×N: N running plus a small delivery buffer) is reached, so
//! memory stays bounded no matter how large the input is.
//!
//! A batch that ends with admitted-but-unresolved items and no cancellation
//! is a defect and surfaces as [`MapError::Incomplete`] instead of silently
//! truncating results.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::pipeline::ConcurrencyPolicy;

#[derive(Debug, Error)]
pub enum MapError {
    /// The batch completed while admitted items were still unresolved and
    /// nothing was cancelled. Always a bug in the pipeline, never data.
    #[error("bounded batch ended with {missing} admitted item(s) unresolved")]
    Incomplete { missing: usize },

    /// One or more transform tasks panicked.
    #[error("{count} transform task(s) panicked")]
    TaskPanicked { count: usize },

    /// The batch driver itself failed to run to completion.
    #[error("batch driver task failed")]
    Driver,
}

struct DriverStats {
    admitted: usize,
    delivered: usize,
    panicked: usize,
    cancelled: bool,
}

/// Lazily consumed output sequence of one bounded batch.
pub struct Unordered<T> {
    rx: mpsc::Receiver<T>,
    driver: Option<JoinHandle<DriverStats>>,
    failed: bool,
}

impl<T> Unordered<T> {
    /// Next output, in completion order. After the last output, reconciles
    /// the batch accounting exactly once; a shortfall without cancellation
    /// yields an error rather than quiet truncation.
    pub async fn next(&mut self) -> Option<Result<T, MapError>> {
        if let Some(item) = self.rx.recv().await {
            return Some(Ok(item));
        }
        if self.failed {
            return None;
        }
        let driver = self.driver.take()?;
        match driver.await {
            Err(_) => {
                self.failed = true;
                Some(Err(MapError::Driver))
            }
            Ok(stats) => {
                if stats.panicked > 0 {
                    self.failed = true;
                    return Some(Err(MapError::TaskPanicked {
                        count: stats.panicked,
                    }));
                }
                if stats.delivered != stats.admitted && !stats.cancelled {
                    self.failed = true;
                    return Some(Err(MapError::Incomplete {
                        missing: stats.admitted - stats.delivered,
                    }));
                }
                None
            }
        }
    }

    /// Drains the batch into a vec, propagating the first batch error.
    pub async fn collect(mut self) -> Result<Vec<T>, MapError> {
        let mut out = Vec::new();
        while let Some(next) = self.next().await {
            out.push(next?);
        }
        Ok(out)
    }
}

/// Fans `transform` out over `items` with at most `policy.limit()` running
/// concurrently. Cancelling `cancel` stops admitting new items; transforms
/// already running complete and are delivered.
pub fn map_unordered<I, T, U, F, Fut>(
    items: I,
    policy: ConcurrencyPolicy,
    cancel: CancellationToken,
    transform: F,
) -> Unordered<U>
where
    I: IntoIterator<Item = T> + Send + 'static,
    I::IntoIter: Send + 'static,
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = U> + Send + 'static,
{
    let limit = policy.limit();
    let buffer = policy.admission_capacity() - limit;
    let (tx, rx) = mpsc::channel(buffer);
    let driver = tokio::spawn(drive(items.into_iter(), limit, cancel, transform, tx));
    Unordered {
        rx,
        driver: Some(driver),
        failed: false,
    }
}

async fn drive<T, U, F, Fut>(
    items: impl Iterator<Item = T>,
    limit: usize,
    cancel: CancellationToken,
    transform: F,
    tx: mpsc::Sender<U>,
) -> DriverStats
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = U> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit));
    let transform = Arc::new(transform);
    let mut join_set = JoinSet::new();
    let mut admitted = 0usize;

    for item in items {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                Ok(p) => p,
                Err(_) => break,
            },
        };
        admitted += 1;
        let tx = tx.clone();
        let transform = Arc::clone(&transform);
        join_set.spawn(async move {
            let output = transform(item).await;
            // The permit is held until delivery so completed-but-unconsumed
            // outputs count against the admission ceiling.
            let sent = tx.send(output).await.is_ok();
            drop(permit);
            sent
        });
    }
    drop(tx);

    let mut delivered = 0usize;
    let mut panicked = 0usize;
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(true) => delivered += 1,
            // Receiver dropped: the consumer abandoned the batch.
            Ok(false) => {}
            Err(_) => panicked += 1,
        }
    }

    DriverStats {
        admitted,
        delivered,
        panicked,
        cancelled: cancel.is_cancelled(),
    }
}
