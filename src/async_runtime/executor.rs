//! Thread-per-task executor
//!
//! Every task gets its own named OS thread. The executor keeps no list of
//! tasks, only counters, so fire-and-forget work leaves nothing behind once
//! it finishes.

use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

use super::config::ExecutorConfig;
use super::handle::TaskHandle;
use crate::concepts::Callable;
use crate::error::{XenonError, XenonResult};
use crate::time::sleep;

/// Task ID used for thread names and log fields
pub type TaskId = usize;

/// Snapshot of the executor counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutorStats {
    /// Threads successfully started
    pub spawned: usize,
    /// Tasks whose operation returned
    pub completed: usize,
    /// Tasks whose operation panicked
    pub panicked: usize,
    /// Tasks started but not yet finished
    pub running: usize,
}

#[derive(Debug, Default)]
struct Counters {
    spawned: AtomicUsize,
    completed: AtomicUsize,
    panicked: AtomicUsize,
    running: AtomicUsize,
}

/// Thread-per-task executor
pub struct Executor {
    config: ExecutorConfig,
    next_task_id: AtomicUsize,
    counters: Arc<Counters>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

impl Executor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            next_task_id: AtomicUsize::new(0),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Process-wide executor used by the free functions, configured from the
    /// environment on first use.
    pub fn global() -> &'static Executor {
        static GLOBAL: OnceLock<Executor> = OnceLock::new();
        GLOBAL.get_or_init(|| Executor::new(ExecutorConfig::from_env()))
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn stats(&self) -> ExecutorStats {
        ExecutorStats {
            spawned: self.counters.spawned.load(Ordering::Acquire),
            completed: self.counters.completed.load(Ordering::Acquire),
            panicked: self.counters.panicked.load(Ordering::Acquire),
            running: self.counters.running.load(Ordering::Acquire),
        }
    }

    /// Spawn `operation(args)` on a new thread and return a handle to its
    /// outcome.
    pub fn spawn<F, Args>(&self, operation: F, args: Args) -> XenonResult<TaskHandle<F::Output>>
    where
        F: Callable<Args> + Send + 'static,
        Args: Send + 'static,
        F::Output: Send + 'static,
    {
        self.launch(move |_| operation.call_with(args))
    }

    /// Fire-and-forget: spawn `operation(args)` and drop the handle.
    ///
    /// A panic inside the operation is caught and logged; nothing reaches the
    /// caller. A thread that cannot be created is logged as well.
    pub fn run<F, Args>(&self, operation: F, args: Args)
    where
        F: Callable<Args> + Send + 'static,
        Args: Send + 'static,
        F::Output: Send + 'static,
    {
        if let Err(err) = self.spawn(operation, args) {
            tracing::error!(error = %err, "failed to launch task");
        }
    }

    /// Fire-and-forget for fallible operations: an `Err` is logged at `warn`.
    pub fn try_run<F, Args, T, E>(&self, operation: F, args: Args)
    where
        F: Callable<Args, Output = Result<T, E>> + Send + 'static,
        Args: Send + 'static,
        E: Display,
    {
        let launched = self.launch(move |task| {
            if let Err(e) = operation.call_with(args) {
                let err = XenonError::task_failed(task, e.to_string());
                tracing::warn!(task, error = %err, "task returned an error");
            }
        });
        if let Err(err) = launched {
            tracing::error!(error = %err, "failed to launch task");
        }
    }

    /// Spawn a thread that calls `producer(args)`, waits `delay`, then feeds
    /// the produced value to `consumer`. The handle carries the consumer's
    /// output.
    pub fn spawn_chain<P, C, Args>(
        &self,
        producer: P,
        consumer: C,
        args: Args,
        delay: Duration,
    ) -> XenonResult<TaskHandle<C::Output>>
    where
        P: Callable<Args> + Send + 'static,
        C: Callable<(P::Output,)> + Send + 'static,
        Args: Send + 'static,
        C::Output: Send + 'static,
    {
        self.launch(move |task| {
            let value = producer.call_with(args);
            tracing::trace!(task, "producer returned");
            sleep(delay);
            consumer.call_with((value,))
        })
    }

    /// Fire-and-forget version of [`spawn_chain`](Self::spawn_chain)
    pub fn then<P, C, Args>(&self, producer: P, consumer: C, args: Args, delay: Duration)
    where
        P: Callable<Args> + Send + 'static,
        C: Callable<(P::Output,)> + Send + 'static,
        Args: Send + 'static,
        C::Output: Send + 'static,
    {
        if let Err(err) = self.spawn_chain(producer, consumer, args, delay) {
            tracing::error!(error = %err, "failed to launch chained task");
        }
    }

    /// Spawn a thread that waits `delay` and then calls `operation(args)`
    pub fn spawn_after<F, Args>(
        &self,
        operation: F,
        delay: Duration,
        args: Args,
    ) -> XenonResult<TaskHandle<F::Output>>
    where
        F: Callable<Args> + Send + 'static,
        Args: Send + 'static,
        F::Output: Send + 'static,
    {
        self.launch(move |_| {
            sleep(delay);
            operation.call_with(args)
        })
    }

    /// Fire-and-forget version of [`spawn_after`](Self::spawn_after)
    pub fn run_after<F, Args>(&self, operation: F, delay: Duration, args: Args)
    where
        F: Callable<Args> + Send + 'static,
        Args: Send + 'static,
        F::Output: Send + 'static,
    {
        if let Err(err) = self.spawn_after(operation, delay, args) {
            tracing::error!(error = %err, "failed to launch delayed task");
        }
    }

    /// Start `work` on a fresh thread under the panic guard
    fn launch<R, W>(&self, work: W) -> XenonResult<TaskHandle<R>>
    where
        W: FnOnce(&str) -> R + Send + 'static,
        R: Send + 'static,
    {
        let id = self.next_task_id.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}-{}", self.config.thread_name_prefix, id);

        let (sender, receiver) = mpsc::sync_channel(1);
        let finished = Arc::new(AtomicBool::new(false));

        let mut builder = thread::Builder::new().name(name.clone());
        if let Some(bytes) = self.config.stack_size {
            builder = builder.stack_size(bytes);
        }

        let counters = Arc::clone(&self.counters);
        let done = Arc::clone(&finished);
        let report_panics = self.config.report_panics;
        let task = name.clone();

        counters.spawned.fetch_add(1, Ordering::AcqRel);
        counters.running.fetch_add(1, Ordering::AcqRel);

        let spawned = builder.spawn(move || {
            let outcome = guard(&task, || work(&task));
            match &outcome {
                Ok(_) => {
                    counters.completed.fetch_add(1, Ordering::AcqRel);
                    tracing::trace!(task = %task, "task completed");
                }
                Err(err) => {
                    counters.panicked.fetch_add(1, Ordering::AcqRel);
                    if report_panics {
                        tracing::error!(task = %task, error = %err, "task panicked");
                    }
                }
            }
            counters.running.fetch_sub(1, Ordering::AcqRel);

            // The receiver is gone for fire-and-forget tasks
            let _ = sender.send(outcome);
            done.store(true, Ordering::Release);
        });

        match spawned {
            Ok(_) => {
                tracing::debug!(task = %name, "spawned task");
                Ok(TaskHandle::new(id, name, receiver, finished))
            }
            Err(e) => {
                self.counters.spawned.fetch_sub(1, Ordering::AcqRel);
                self.counters.running.fetch_sub(1, Ordering::AcqRel);
                Err(XenonError::spawn_failed(format!(
                    "could not start thread {}: {}",
                    name, e
                )))
            }
        }
    }
}

/// Run `work`, converting a panic into [`XenonError::TaskPanicked`]
pub(crate) fn guard<R>(task: &str, work: impl FnOnce() -> R) -> XenonResult<R> {
    panic::catch_unwind(AssertUnwindSafe(work))
        .map_err(|payload| XenonError::task_panicked(task, panic_message(&payload)))
}

fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
