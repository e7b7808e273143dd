// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Concurrent breadth-first walk over the component graph.
//!
//! A fixed pool of workers pops references from a shared frontier and hands
//! each to an [`Expand`] implementation, which returns the newly discovered
//! references to push back. The walk is over once the frontier is empty and
//! no expansion is in flight; the worker that observes this wakes the rest.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::{ComponentReference, Error};

#[cfg(test)]
#[path = "./walker_test.rs"]
mod walker_test;

/// Default number of concurrent expansions.
pub const DEFAULT_WORKERS: usize = 8;

/// Expands one component, returning the references it discovered.
#[async_trait]
pub trait Expand: Send + Sync {
    async fn expand(&self, reference: &ComponentReference)
    -> crate::Result<Vec<ComponentReference>>;
}

/// Options for walking a graph.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Number of concurrent workers.
    pub workers: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Drives expansion of a graph from one or more roots.
pub struct Walker {
    expander: Arc<dyn Expand>,
    workers: usize,
}

#[derive(Debug, Default)]
struct Frontier {
    queue: VecDeque<ComponentReference>,
    /// Everything ever queued during this walk.
    scheduled: HashSet<ComponentReference>,
    in_flight: usize,
    expanded: usize,
    finished: bool,
}

impl Frontier {
    fn push(&mut self, reference: ComponentReference) {
        if self.scheduled.insert(reference.clone()) {
            tracing::trace!(component = %reference, "queued");
            self.queue.push_back(reference);
        }
    }
}

struct Shared {
    expander: Arc<dyn Expand>,
    frontier: Mutex<Frontier>,
    wake: Notify,
    errors: Mutex<Vec<Error>>,
    cancel: CancellationToken,
}

enum Step {
    Expand(ComponentReference),
    Wait,
    Finish,
    Stop,
}

impl Walker {
    /// Create a walker running `workers` expansions at a time (at least one).
    pub fn new(expander: Arc<dyn Expand>, workers: usize) -> Self {
        Self {
            expander,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Walk everything reachable from `root`.
    pub async fn walk(&self, root: ComponentReference) -> crate::Result<()> {
        self.walk_all([root]).await
    }

    /// Walk everything reachable from any of `roots`.
    pub async fn walk_all<I>(&self, roots: I) -> crate::Result<()>
    where
        I: IntoIterator<Item = ComponentReference>,
    {
        self.walk_with_cancel(roots, CancellationToken::new()).await
    }

    /// Walk until the frontier drains or `cancel` fires.
    ///
    /// Failed expansions do not stop the walk; all failures are returned
    /// together once every worker has stopped. After cancellation running
    /// expansions complete but nothing new is popped.
    pub async fn walk_with_cancel<I>(&self, roots: I, cancel: CancellationToken) -> crate::Result<()>
    where
        I: IntoIterator<Item = ComponentReference>,
    {
        let mut frontier = Frontier::default();
        for root in roots {
            frontier.push(root);
        }
        tracing::info!(roots = frontier.queue.len(), workers = self.workers, "starting walk");

        let shared = Arc::new(Shared {
            expander: Arc::clone(&self.expander),
            frontier: Mutex::new(frontier),
            wake: Notify::new(),
            errors: Mutex::new(Vec::new()),
            cancel,
        });

        let mut workers = JoinSet::new();
        for worker in 0..self.workers {
            workers.spawn(work(Arc::clone(&shared), worker));
        }
        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                shared.errors.lock().push(Error::WorkerPanicked(err.to_string()));
            }
        }

        let mut errors = std::mem::take(&mut *shared.errors.lock());
        let (expanded, pending) = {
            let frontier = shared.frontier.lock();
            (frontier.expanded, frontier.queue.len())
        };
        if shared.cancel.is_cancelled() && pending > 0 {
            errors.push(Error::Cancelled { pending });
        }
        tracing::info!(expanded, failed = errors.len(), "walk finished");

        if errors.is_empty() {
            return Ok(());
        }
        errors.sort_by_cached_key(ToString::to_string);
        Err(Error::Walk { errors })
    }
}

async fn work(shared: Arc<Shared>, worker: usize) {
    loop {
        let mut notified = std::pin::pin!(shared.wake.notified());
        let step = {
            let mut frontier = shared.frontier.lock();
            if frontier.finished || shared.cancel.is_cancelled() {
                Step::Stop
            } else if let Some(reference) = frontier.queue.pop_front() {
                frontier.in_flight += 1;
                Step::Expand(reference)
            } else if frontier.in_flight == 0 {
                frontier.finished = true;
                Step::Finish
            } else {
                // Register before unlocking so a completion cannot slip past.
                notified.as_mut().enable();
                Step::Wait
            }
        };

        match step {
            Step::Stop => return,
            Step::Finish => {
                tracing::trace!(worker, "frontier drained");
                shared.wake.notify_waiters();
                return;
            }
            Step::Wait => {
                tokio::select! {
                    _ = notified.as_mut() => {}
                    _ = shared.cancel.cancelled() => {}
                }
            }
            Step::Expand(reference) => {
                tracing::trace!(worker, component = %reference, "expanding");
                let result = expand_isolated(&shared, &reference).await;

                let mut frontier = shared.frontier.lock();
                frontier.in_flight -= 1;
                frontier.expanded += 1;
                match result {
                    Ok(discovered) => {
                        for next in discovered {
                            frontier.push(next);
                        }
                    }
                    Err(err) => {
                        tracing::warn!(component = %reference, error = %err, "expansion failed");
                        shared.errors.lock().push(err.expanding(&reference));
                    }
                }
                drop(frontier);
                shared.wake.notify_waiters();
            }
        }
    }
}

/// Run one expansion on its own task so a panic is reported, not fatal.
async fn expand_isolated(
    shared: &Shared,
    reference: &ComponentReference,
) -> crate::Result<Vec<ComponentReference>> {
    let expander = Arc::clone(&shared.expander);
    let target = reference.clone();
    match tokio::spawn(async move { expander.expand(&target).await }).await {
        Ok(result) => result,
        Err(err) => Err(Error::WorkerPanicked(err.to_string())),
    }
}
