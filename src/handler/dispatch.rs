//! Synchronous vs. asynchronous dispatch.
//!
//! Async dispatches are handed to a [`Scheduler`] and their [`PendingWork`]
//! handles are appended to a [`PendingList`] shared by every handler derived
//! from the same root. The list is only emptied by shutdown.

use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::HandlerError;
use crate::observability::metrics;

/// A dispatch job: the full record pipeline, ready to run.
pub type Job = Box<dyn FnOnce() -> Result<(), HandlerError> + Send + 'static>;

/// Background execution facility used when async dispatch is enabled.
pub trait Scheduler: Send + Sync {
    /// Start `job` and return a handle that resolves with its result.
    fn submit(&self, job: Job) -> PendingWork;
}

/// One in-flight async dispatch.
pub struct PendingWork {
    handle: JoinHandle<Result<(), HandlerError>>,
}

impl PendingWork {
    pub fn from_join_handle(handle: JoinHandle<Result<(), HandlerError>>) -> Self {
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the dispatch to finish and return its result.
    pub async fn wait(self) -> Result<(), HandlerError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(HandlerError::Join(e.to_string())),
        }
    }
}

impl fmt::Debug for PendingWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingWork")
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Runs jobs on a Tokio runtime's blocking pool.
///
/// Sinks block on network I/O, so jobs never run on the async workers.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Scheduler bound to the runtime the caller is running in, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn submit(&self, job: Job) -> PendingWork {
        PendingWork::from_join_handle(self.handle.spawn_blocking(job))
    }
}

/// Append-only list of outstanding dispatches.
#[derive(Debug, Default)]
pub struct PendingList {
    inner: Mutex<Vec<PendingWork>>,
}

impl PendingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a dispatch and return the new list length.
    pub fn push(&self, work: PendingWork) -> usize {
        let mut inner = self.inner.lock().expect("pending list mutex poisoned");
        inner.push(work);
        inner.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("pending list mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry, in submission order. Each handle is handed out
    /// exactly once.
    pub fn take(&self) -> Vec<PendingWork> {
        std::mem::take(&mut *self.inner.lock().expect("pending list mutex poisoned"))
    }
}

/// Dispatch decision shared by a handler chain.
pub(crate) struct Dispatcher {
    scheduler: Option<Arc<dyn Scheduler>>,
    pending: PendingList,
}

impl Dispatcher {
    pub(crate) fn synchronous() -> Self {
        Self {
            scheduler: None,
            pending: PendingList::new(),
        }
    }

    pub(crate) fn asynchronous(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            scheduler: Some(scheduler),
            pending: PendingList::new(),
        }
    }

    pub(crate) fn is_async(&self) -> bool {
        self.scheduler.is_some()
    }

    pub(crate) fn pending(&self) -> &PendingList {
        &self.pending
    }

    /// Run `job` inline, or schedule it and return immediately.
    pub(crate) fn dispatch(&self, job: Job) -> Result<(), HandlerError> {
        match &self.scheduler {
            None => job(),
            Some(scheduler) => {
                let work = scheduler.submit(job);
                let outstanding = self.pending.push(work);
                metrics::record_scheduled(outstanding);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_sync_dispatch_runs_inline_and_propagates() {
        let dispatcher = Dispatcher::synchronous();
        let ran = Arc::new(AtomicUsize::new(0));

        let r = ran.clone();
        dispatcher
            .dispatch(Box::new(move || -> Result<(), HandlerError> {
                r.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
            .unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 1);

        let err = dispatcher
            .dispatch(Box::new(|| -> Result<(), HandlerError> {
                Err(HandlerError::Join("boom".into()))
            }))
            .unwrap_err();
        assert!(matches!(err, HandlerError::Join(_)));
        assert!(dispatcher.pending().is_empty());
    }

    #[tokio::test]
    async fn test_async_dispatch_records_pending_work() {
        let scheduler = Arc::new(TokioScheduler::current().unwrap());
        let dispatcher = Dispatcher::asynchronous(scheduler);

        for _ in 0..3 {
            dispatcher
                .dispatch(Box::new(|| -> Result<(), HandlerError> {
                    Err(HandlerError::Join("ignored".into()))
                }))
                .unwrap();
        }
        assert_eq!(dispatcher.pending().len(), 3);

        let work = dispatcher.pending().take();
        assert!(dispatcher.pending().is_empty());
        for item in work {
            assert!(item.wait().await.is_err());
        }
    }

    #[test]
    fn test_no_runtime_no_scheduler() {
        assert!(TokioScheduler::current().is_none());
    }
}
