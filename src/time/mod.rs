//! Time module
//!
//! Delayed and repeated execution built on the thread-per-task launcher,
//! plus a stopwatch:
//!
//! - [`set_timeout`], [`set_async_timeout`], [`set_sync_timeout`]: run an
//!   operation once after a delay
//! - [`Interval`], [`set_async_interval`], [`set_sync_interval`]: run an
//!   operation every period until stopped
//! - [`Clock`]: measure elapsed time

pub mod clock;
pub mod interval;
pub mod timeout;

use std::thread;
use std::time::Duration;

pub use clock::{Clock, TimeOrder};
pub use interval::{
    set_async_interval, set_async_interval_with, set_sync_interval, set_sync_interval_with,
    Interval, IntervalController, IntervalMode, IntervalState,
};
pub use timeout::{set_async_timeout, set_sync_timeout, set_timeout, TimeoutMode};

/// Block the current thread for `delay`. A zero delay returns at once
/// without touching the scheduler.
pub fn sleep(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
