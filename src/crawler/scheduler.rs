//! Scheduler for concurrent detail fetches
//!
//! This module handles:
//! - Dispatching one task per item and joining them all
//! - Global concurrency limiting via a semaphore
//! - Correlating each task's output back to its item's index

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Fan-out scheduler with an optional concurrency limit
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Global semaphore for limiting concurrent tasks; None when unbounded
    semaphore: Option<Arc<Semaphore>>,

    limit: Option<usize>,
}

impl Scheduler {
    /// Creates a scheduler
    ///
    /// # Arguments
    ///
    /// * `max_concurrent` - Maximum tasks in flight at once; 0 means unbounded
    pub fn new(max_concurrent: usize) -> Self {
        let limit = (max_concurrent > 0).then_some(max_concurrent);

        Self {
            semaphore: limit.map(|n| Arc::new(Semaphore::new(n))),
            limit,
        }
    }

    /// Returns the concurrency limit, or None when unbounded
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Runs `task` for every item concurrently and waits for all of them
    ///
    /// The returned vector has one slot per item, at the item's index,
    /// regardless of completion order. A slot is None only if its task panicked.
    pub async fn fan_out<T, F, Fut>(&self, items: Vec<String>, task: F) -> Vec<Option<T>>
    where
        T: Send + 'static,
        F: Fn(String) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut slots: Vec<Option<T>> = (0..items.len()).map(|_| None).collect();
        let mut tasks = JoinSet::new();

        for (index, item) in items.into_iter().enumerate() {
            let semaphore = self.semaphore.clone();
            let future = task(item);

            tasks.spawn(async move {
                // Held until the task's output is ready
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                (index, future.await)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, output)) => slots[index] = Some(output),
                Err(e) => tracing::error!("Fetch task failed: {}", e),
            }
        }

        slots
    }
}
