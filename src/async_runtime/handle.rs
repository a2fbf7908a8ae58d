//! Opt-in result channel for a spawned task

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use super::executor::TaskId;
use crate::error::{XenonError, XenonResult};

/// Receiving end for the outcome of one spawned task.
///
/// Dropping the handle does not affect the task; it keeps running and its
/// outcome is discarded, which is exactly the fire-and-forget behavior of
/// [`run`](super::run).
///
/// The outcome can be taken only once. After a successful `join_timeout` or
/// `try_join`, further calls report [`XenonError::Disconnected`].
#[derive(Debug)]
pub struct TaskHandle<T> {
    id: TaskId,
    name: String,
    receiver: Receiver<XenonResult<T>>,
    finished: Arc<AtomicBool>,
    /// The outcome has already been handed out
    taken: AtomicBool,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(
        id: TaskId,
        name: String,
        receiver: Receiver<XenonResult<T>>,
        finished: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            name,
            receiver,
            finished,
            taken: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Name of the thread running the task
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the task has produced its outcome
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Block until the task finishes and return its outcome
    pub fn join(self) -> XenonResult<T> {
        if self.taken.load(Ordering::Acquire) {
            return Err(XenonError::disconnected(&self.name));
        }
        self.receiver
            .recv()
            .unwrap_or_else(|_| Err(XenonError::disconnected(&self.name)))
    }

    /// Block for at most `timeout` waiting for the outcome
    pub fn join_timeout(&self, timeout: Duration) -> XenonResult<T> {
        if self.taken.load(Ordering::Acquire) {
            return Err(XenonError::disconnected(&self.name));
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => self.take(outcome),
            Err(RecvTimeoutError::Timeout) => Err(XenonError::timed_out(&self.name, timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(XenonError::disconnected(&self.name)),
        }
    }

    /// Return the outcome if it is already available
    pub fn try_join(&self) -> Option<XenonResult<T>> {
        if self.taken.load(Ordering::Acquire) {
            return Some(Err(XenonError::disconnected(&self.name)));
        }
        match self.receiver.try_recv() {
            Ok(outcome) => Some(self.take(outcome)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(XenonError::disconnected(&self.name))),
        }
    }

    fn take(&self, outcome: XenonResult<T>) -> XenonResult<T> {
        self.taken.store(true, Ordering::Release);
        outcome
    }
}

#[cfg(feature = "async-runtime")]
impl<T: Send + 'static> TaskHandle<T> {
    /// Wait for the outcome from async code without blocking the runtime
    pub async fn join_async(self) -> XenonResult<T> {
        let name = self.name.clone();
        tokio::task::spawn_blocking(move || self.join())
            .await
            .unwrap_or_else(|e| Err(XenonError::task_panicked(name, e.to_string())))
    }
}
