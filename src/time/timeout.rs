//! One-shot delayed execution

use std::time::Duration;

use super::sleep;
use crate::async_runtime::Executor;
use crate::concepts::Callable;

/// Where a timeout waits and runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutMode {
    /// Wait and run on a new thread; the call returns immediately
    Async,
    /// Wait and run on the calling thread; the call blocks for the delay
    Sync,
}

/// Wait `delay`, then call `operation(args)` once, according to `mode`.
///
/// The operation's output is discarded; use [`set_sync_timeout`] or
/// [`Executor::spawn_after`] to keep it.
pub fn set_timeout<F, Args>(operation: F, delay: Duration, mode: TimeoutMode, args: Args)
where
    F: Callable<Args> + Send + 'static,
    Args: Send + 'static,
    F::Output: Send + 'static,
{
    match mode {
        TimeoutMode::Async => set_async_timeout(operation, delay, args),
        TimeoutMode::Sync => {
            set_sync_timeout(operation, delay, args);
        }
    }
}

/// Run `operation(args)` on a new thread after `delay` and return immediately.
pub fn set_async_timeout<F, Args>(operation: F, delay: Duration, args: Args)
where
    F: Callable<Args> + Send + 'static,
    Args: Send + 'static,
    F::Output: Send + 'static,
{
    tracing::trace!(delay_ms = delay.as_millis() as u64, "scheduling async timeout");
    Executor::global().run_after(operation, delay, args);
}

/// Block for `delay`, then call `operation(args)` on this thread and return
/// its output.
pub fn set_sync_timeout<F, Args>(operation: F, delay: Duration, args: Args) -> F::Output
where
    F: Callable<Args>,
{
    sleep(delay);
    operation.call_with(args)
}
