//! Async runtime module
//!
//! Launches operations on their own OS threads. The free functions here go
//! through [`Executor::global`]; build an [`Executor`] directly for custom
//! thread naming or stack sizes.
//!
//! Everything is fire-and-forget unless the caller asks for a
//! [`TaskHandle`]. A panic inside an operation never escapes its thread: it
//! is caught, logged through `tracing`, and reported to the handle if one
//! exists. Errors returned by the operation are the operation's own business,
//! except for [`try_run`], which logs them.

pub mod config;
pub mod executor;
pub mod handle;

use std::fmt::Display;
use std::time::Duration;

pub use config::ExecutorConfig;
pub use executor::{Executor, ExecutorStats, TaskId};
pub use handle::TaskHandle;

use crate::concepts::Callable;
use crate::error::XenonResult;

/// Run `operation(args)` on a new detached thread and return immediately.
///
/// ```
/// xenon::run(|name: &str| println!("hello {}", name), ("xenon",));
/// ```
pub fn run<F, Args>(operation: F, args: Args)
where
    F: Callable<Args> + Send + 'static,
    Args: Send + 'static,
    F::Output: Send + 'static,
{
    Executor::global().run(operation, args);
}

/// Like [`run`], for operations returning `Result`; an `Err` is logged.
pub fn try_run<F, Args, T, E>(operation: F, args: Args)
where
    F: Callable<Args, Output = Result<T, E>> + Send + 'static,
    Args: Send + 'static,
    E: Display,
{
    Executor::global().try_run(operation, args);
}

/// Run `operation(args)` on a new thread and keep a handle to its outcome.
pub fn spawn<F, Args>(operation: F, args: Args) -> XenonResult<TaskHandle<F::Output>>
where
    F: Callable<Args> + Send + 'static,
    Args: Send + 'static,
    F::Output: Send + 'static,
{
    Executor::global().spawn(operation, args)
}

/// On one new thread: call `producer(args)`, sleep `delay` (skipped when
/// zero), then call `consumer` with the produced value.
pub fn then<P, C, Args>(producer: P, consumer: C, args: Args, delay: Duration)
where
    P: Callable<Args> + Send + 'static,
    C: Callable<(P::Output,)> + Send + 'static,
    Args: Send + 'static,
    C::Output: Send + 'static,
{
    Executor::global().then(producer, consumer, args, delay);
}
