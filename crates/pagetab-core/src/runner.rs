//! Single-slot background task runners.
//!
//! Each tab owns one runner. A runner accepts at most one task at a time,
//! executes it away from the interactive thread and posts a
//! [`TaskCompletion`] on the shared completion channel. The interactive thread
//! drains that channel and hands each completion back to the owning runner via
//! [`TaskRunner::finish`], which frees the slot and reports whether the result
//! is still wanted. A cancelled task's completion carries a stale ticket and is
//! dropped there.

use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Work accepted by a runner. Failures are reported as display text.
pub type TaskFuture<T> = BoxFuture<'static, Result<T, String>>;

pub type CompletionSender<T> = UnboundedSender<TaskCompletion<T>>;
pub type CompletionReceiver<T> = UnboundedReceiver<TaskCompletion<T>>;

pub fn completion_channel<T>() -> (CompletionSender<T>, CompletionReceiver<T>) {
    mpsc::unbounded_channel()
}

/// Identity of one submitted task: which runner owns it and which of that
/// runner's submissions it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskTicket {
    pub owner: u64,
    pub generation: u64,
}

#[derive(Debug)]
pub struct TaskCompletion<T> {
    pub ticket: TaskTicket,
    pub outcome: Result<T, String>,
}

pub trait TaskRunner<T>: Send {
    /// Start `work` unless a task is already outstanding. Returns whether the
    /// work was accepted; a rejected submission changes nothing.
    fn submit(&mut self, work: TaskFuture<T>) -> bool;

    /// Abandon the outstanding task, if any, and free the slot immediately.
    fn cancel(&mut self);

    fn outstanding(&self) -> Option<TaskTicket>;

    /// Accept a delivered completion. Frees the slot and returns true when the
    /// ticket belongs to the outstanding task; returns false for a stale
    /// ticket, leaving the slot untouched.
    fn finish(&mut self, ticket: TaskTicket) -> bool;

    fn is_busy(&self) -> bool {
        self.outstanding().is_some()
    }
}

/// Creates the runner for each new tab.
pub trait RunnerFactory<T>: Send + Sync {
    fn create(&self, owner: u64) -> Box<dyn TaskRunner<T>>;
}

/// Bookkeeping shared by runner implementations.
#[derive(Debug)]
struct Slot {
    owner: u64,
    next_generation: u64,
    outstanding: Option<TaskTicket>,
}

impl Slot {
    fn new(owner: u64) -> Self {
        Self {
            owner,
            next_generation: 0,
            outstanding: None,
        }
    }

    fn occupy(&mut self) -> Option<TaskTicket> {
        if self.outstanding.is_some() {
            return None;
        }
        let ticket = TaskTicket {
            owner: self.owner,
            generation: self.next_generation,
        };
        self.next_generation += 1;
        self.outstanding = Some(ticket);
        Some(ticket)
    }

    fn release(&mut self, ticket: TaskTicket) -> bool {
        if self.outstanding == Some(ticket) {
            self.outstanding = None;
            true
        } else {
            false
        }
    }

    fn clear(&mut self) -> Option<TaskTicket> {
        self.outstanding.take()
    }
}

// =============================================================================
// Threaded runner - production
// =============================================================================

/// Runs tasks on a tokio runtime.
pub struct ThreadedRunner<T> {
    slot: Slot,
    handle: Handle,
    completions: CompletionSender<T>,
    task: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> ThreadedRunner<T> {
    pub fn new(owner: u64, handle: Handle, completions: CompletionSender<T>) -> Self {
        Self {
            slot: Slot::new(owner),
            handle,
            completions,
            task: None,
        }
    }
}

impl<T: Send + 'static> TaskRunner<T> for ThreadedRunner<T> {
    fn submit(&mut self, work: TaskFuture<T>) -> bool {
        let Some(ticket) = self.slot.occupy() else {
            return false;
        };
        let completions = self.completions.clone();
        trace!(?ticket, "spawning task");
        self.task = Some(self.handle.spawn(async move {
            let outcome = work.await;
            // The receiver is gone only when the session is shutting down.
            let _ = completions.send(TaskCompletion { ticket, outcome });
        }));
        true
    }

    fn cancel(&mut self) {
        if let Some(ticket) = self.slot.clear() {
            debug!(?ticket, "cancelling task");
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn outstanding(&self) -> Option<TaskTicket> {
        self.slot.outstanding
    }

    fn finish(&mut self, ticket: TaskTicket) -> bool {
        let current = self.slot.release(ticket);
        if current {
            self.task = None;
        }
        current
    }
}

pub struct ThreadedRunnerFactory<T> {
    handle: Handle,
    completions: CompletionSender<T>,
}

impl<T> ThreadedRunnerFactory<T> {
    pub fn new(handle: Handle, completions: CompletionSender<T>) -> Self {
        Self {
            handle,
            completions,
        }
    }
}

impl<T: Send + 'static> RunnerFactory<T> for ThreadedRunnerFactory<T> {
    fn create(&self, owner: u64) -> Box<dyn TaskRunner<T>> {
        Box::new(ThreadedRunner::new(
            owner,
            self.handle.clone(),
            self.completions.clone(),
        ))
    }
}

// =============================================================================
// Immediate runner - deterministic, for tests
// =============================================================================

/// Runs each task to completion inside `submit` on the calling thread.
///
/// The completion is still posted on the channel, so the slot stays occupied
/// until the caller drains it exactly as with [`ThreadedRunner`]. Work must
/// not depend on a tokio reactor.
pub struct ImmediateRunner<T> {
    slot: Slot,
    completions: CompletionSender<T>,
}

impl<T> ImmediateRunner<T> {
    pub fn new(owner: u64, completions: CompletionSender<T>) -> Self {
        Self {
            slot: Slot::new(owner),
            completions,
        }
    }
}

impl<T: Send + 'static> TaskRunner<T> for ImmediateRunner<T> {
    fn submit(&mut self, work: TaskFuture<T>) -> bool {
        let Some(ticket) = self.slot.occupy() else {
            return false;
        };
        let outcome = futures::executor::block_on(work);
        let _ = self.completions.send(TaskCompletion { ticket, outcome });
        true
    }

    fn cancel(&mut self) {
        self.slot.clear();
    }

    fn outstanding(&self) -> Option<TaskTicket> {
        self.slot.outstanding
    }

    fn finish(&mut self, ticket: TaskTicket) -> bool {
        self.slot.release(ticket)
    }
}

pub struct ImmediateRunnerFactory<T> {
    completions: CompletionSender<T>,
}

impl<T> ImmediateRunnerFactory<T> {
    pub fn new(completions: CompletionSender<T>) -> Self {
        Self { completions }
    }
}

impl<T: Send + 'static> RunnerFactory<T> for ImmediateRunnerFactory<T> {
    fn create(&self, owner: u64) -> Box<dyn TaskRunner<T>> {
        Box::new(ImmediateRunner::new(owner, self.completions.clone()))
    }
}
