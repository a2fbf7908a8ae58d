//! # Xenon
//!
//! Small concurrency helpers built on plain OS threads:
//! - Fire-and-forget task launch with bound arguments (`run`)
//! - Producer/consumer chaining on one thread (`then`)
//! - One-shot delays (`set_timeout` and friends)
//! - Pausable, stoppable intervals (`set_async_interval`, `set_sync_interval`)
//!
//! ## Architecture
//!
//! - `concepts`: Compile-time capability predicates used as bounds
//! - `async_runtime`: Thread-per-task executor, task handles, configuration
//! - `time`: Timeouts, intervals and a stopwatch clock
//! - `error`: Error handling and diagnostics
//!
//! There is no thread pool. Each launch creates one named thread, and a
//! panic inside an operation is caught at the thread boundary and logged
//! rather than aborting the process.
//!
//! ```
//! use std::time::Duration;
//!
//! let interval = xenon::set_async_interval(|| println!("tick"), Duration::from_millis(50))?;
//! std::thread::sleep(Duration::from_millis(120));
//! interval.stop();
//! # Ok::<(), xenon::XenonError>(())
//! ```

pub mod async_runtime;
pub mod concepts;
pub mod error;
pub mod time;

// Re-export commonly used types
pub use async_runtime::{
    run, spawn, then, try_run, Executor, ExecutorConfig, ExecutorStats, TaskHandle, TaskId,
};
pub use concepts::{Callable, CallableMut};
pub use error::{Diagnostic, XenonError, XenonResult};
pub use time::{
    set_async_interval, set_async_interval_with, set_async_timeout, set_sync_interval,
    set_sync_interval_with, set_sync_timeout, set_timeout, Clock, Interval, IntervalController,
    IntervalMode, IntervalState, TimeOrder, TimeoutMode,
};

/// Version of the Xenon crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[cfg(feature = "async-runtime")]
    #[tokio::test]
    async fn test_join_async() {
        let handle = spawn(|a: u32| a * 2, (21,)).unwrap();
        assert_eq!(handle.join_async().await, Ok(42));
    }
}
