//! Repeating execution with pause, resume and stop
//!
//! An [`Interval`] calls its operation once per period. The loop sleeps on a
//! condition variable, so [`Interval::stop`] wakes it at once instead of
//! waiting out the current period. `Stopped` is terminal: the loop exits and
//! the handle cannot be restarted.
//!
//! Two modes:
//!
//! - [`IntervalMode::Dedicated`]: the loop runs on its own thread, started by
//!   the constructor.
//! - [`IntervalMode::Inline`]: the constructor returns an idle handle and
//!   [`Interval::run_blocking`] runs the loop on the calling thread until
//!   some other thread stops it through an [`IntervalController`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crate::async_runtime::executor::guard;
use crate::async_runtime::{Executor, TaskHandle};
use crate::concepts::CallableMut;
use crate::error::{XenonError, XenonResult};

type Operation = Box<dyn FnMut() + Send>;

/// Run flag of an interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalState {
    Running,
    Paused,
    Stopped,
}

/// Where the interval loop runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalMode {
    /// On a thread owned by the handle
    Dedicated,
    /// On whichever thread calls [`Interval::run_blocking`]
    Inline,
}

#[derive(Debug)]
struct Control {
    state: IntervalState,
    /// The operation is executing right now
    invoking: bool,
    /// Thread currently driving the loop
    driver: Option<ThreadId>,
}

#[derive(Debug)]
struct Shared {
    control: Mutex<Control>,
    changed: Condvar,
    ticks: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, Control>) -> MutexGuard<'a, Control> {
        self.changed
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_timeout<'a>(
        &self,
        guard: MutexGuard<'a, Control>,
        timeout: Duration,
    ) -> MutexGuard<'a, Control> {
        match self.changed.wait_timeout(guard, timeout) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }
}

/// Cloneable access to an interval's run flag.
///
/// All transitions are safe from any thread. `pause` and `stop` called off
/// the loop's thread return only once an invocation already in progress has
/// finished, so after they return the operation is not running.
#[derive(Debug, Clone)]
pub struct IntervalController {
    shared: Arc<Shared>,
}

impl IntervalController {
    fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                control: Mutex::new(Control {
                    state: IntervalState::Running,
                    invoking: false,
                    driver: None,
                }),
                changed: Condvar::new(),
                ticks: AtomicU64::new(0),
            }),
        }
    }

    pub fn state(&self) -> IntervalState {
        self.shared.lock().state
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == IntervalState::Stopped
    }

    /// Number of completed invocations
    pub fn ticks(&self) -> u64 {
        self.shared.ticks.load(Ordering::Acquire)
    }

    /// `Running → Paused`. The loop keeps waking each period but skips the
    /// operation. No-op in any other state.
    pub fn pause(&self) -> IntervalState {
        self.transition("pause", |state| match state {
            IntervalState::Running => Some(IntervalState::Paused),
            _ => None,
        })
    }

    /// `Paused → Running`. Invocation resumes at the next period boundary.
    /// No-op in any other state; a stopped interval stays stopped.
    pub fn resume(&self) -> IntervalState {
        self.transition("resume", |state| match state {
            IntervalState::Paused => Some(IntervalState::Running),
            _ => None,
        })
    }

    /// `Running | Paused → Stopped`. Wakes the loop so it exits immediately.
    /// Stopping twice is a no-op.
    pub fn stop(&self) -> IntervalState {
        self.transition("stop", |state| match state {
            IntervalState::Stopped => None,
            _ => Some(IntervalState::Stopped),
        })
    }

    fn transition(
        &self,
        action: &str,
        next: impl FnOnce(IntervalState) -> Option<IntervalState>,
    ) -> IntervalState {
        let mut control = self.shared.lock();
        if let Some(state) = next(control.state) {
            tracing::debug!(from = ?control.state, to = ?state, "interval {}", action);
            control.state = state;
            self.shared.changed.notify_all();
        }

        // Waiting from inside the operation would deadlock on ourselves
        let on_driver = control.driver == Some(thread::current().id());
        if control.state != IntervalState::Running && !on_driver {
            while control.invoking {
                control = self.shared.wait(control);
            }
        }
        control.state
    }

    /// Drive the loop on the current thread until stopped
    fn drive(&self, period: Duration, operation: &mut (dyn FnMut() + Send)) {
        let shared = &self.shared;
        let task = thread::current()
            .name()
            .unwrap_or("interval")
            .to_string();

        let mut control = shared.lock();
        control.driver = Some(thread::current().id());

        'periods: loop {
            // `None` when the period reaches past what `Instant` can represent
            let deadline = Instant::now().checked_add(period);
            loop {
                if control.state == IntervalState::Stopped {
                    break 'periods;
                }
                match deadline {
                    Some(deadline) => {
                        let now = Instant::now();
                        if now >= deadline {
                            break;
                        }
                        control = shared.wait_timeout(control, deadline - now);
                    }
                    None => control = shared.wait(control),
                }
            }

            if control.state != IntervalState::Running {
                continue;
            }

            control.invoking = true;
            drop(control);

            let outcome = guard(&task, &mut *operation);
            if outcome.is_ok() {
                shared.ticks.fetch_add(1, Ordering::AcqRel);
            }

            control = shared.lock();
            control.invoking = false;
            if let Err(err) = outcome {
                tracing::error!(task = %task, error = %err, "interval operation panicked, stopping");
                control.state = IntervalState::Stopped;
            }
            shared.changed.notify_all();
        }

        control.driver = None;
        tracing::debug!(task = %task, ticks = self.ticks(), "interval loop exited");
    }
}

/// Owned handle of a repeating operation.
///
/// Dropping the handle stops the interval; a dedicated loop thread is joined
/// unless the handle is dropped on that very thread.
pub struct Interval {
    controller: IntervalController,
    period: Duration,
    mode: IntervalMode,
    /// Operation waiting for `run_blocking` (inline mode only)
    pending: Mutex<Option<Operation>>,
    worker: Option<TaskHandle<()>>,
}

impl Interval {
    /// Start calling `operation` every `period` on a dedicated thread.
    pub fn spawn<F>(operation: F, period: Duration) -> XenonResult<Self>
    where
        F: FnMut() + Send + 'static,
    {
        Self::spawn_on(Executor::global(), operation, period)
    }

    /// Like [`spawn`](Self::spawn), using `executor` for the loop thread.
    pub fn spawn_on<F>(executor: &Executor, operation: F, period: Duration) -> XenonResult<Self>
    where
        F: FnMut() + Send + 'static,
    {
        check_period(period)?;
        let controller = IntervalController::new();
        let driver = controller.clone();
        let mut operation: Operation = Box::new(operation);

        let worker = executor.spawn(move || driver.drive(period, operation.as_mut()), ())?;
        tracing::debug!(
            task = worker.name(),
            period_ms = period.as_millis() as u64,
            "interval started"
        );

        Ok(Self {
            controller,
            period,
            mode: IntervalMode::Dedicated,
            pending: Mutex::new(None),
            worker: Some(worker),
        })
    }

    /// Create an idle inline interval. Nothing runs until
    /// [`run_blocking`](Self::run_blocking) is called.
    pub fn inline<F>(operation: F, period: Duration) -> XenonResult<Self>
    where
        F: FnMut() + Send + 'static,
    {
        check_period(period)?;
        let operation: Operation = Box::new(operation);
        Ok(Self {
            controller: IntervalController::new(),
            period,
            mode: IntervalMode::Inline,
            pending: Mutex::new(Some(operation)),
            worker: None,
        })
    }

    /// Run the loop of an inline interval on the current thread, blocking
    /// until it is stopped from elsewhere.
    ///
    /// Returns at once if the interval is already stopped. Fails for a
    /// dedicated interval or when the loop has already been run.
    pub fn run_blocking(&self) -> XenonResult<()> {
        if self.mode == IntervalMode::Dedicated {
            return Err(XenonError::invalid_argument(
                "interval already runs on its own thread",
            ));
        }

        let taken = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let mut operation = taken.ok_or_else(|| {
            XenonError::invalid_argument("interval loop has already been run")
        })?;

        self.controller.drive(self.period, operation.as_mut());
        Ok(())
    }

    pub fn pause(&self) -> IntervalState {
        self.controller.pause()
    }

    pub fn resume(&self) -> IntervalState {
        self.controller.resume()
    }

    pub fn stop(&self) -> IntervalState {
        self.controller.stop()
    }

    pub fn state(&self) -> IntervalState {
        self.controller.state()
    }

    pub fn ticks(&self) -> u64 {
        self.controller.ticks()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn mode(&self) -> IntervalMode {
        self.mode
    }

    /// A controller for pausing or stopping this interval from other threads
    pub fn controller(&self) -> IntervalController {
        self.controller.clone()
    }
}

impl fmt::Debug for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interval")
            .field("period", &self.period)
            .field("mode", &self.mode)
            .field("state", &self.state())
            .field("ticks", &self.ticks())
            .finish()
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.controller.stop();
        let on_driver = self.controller.shared.lock().driver == Some(thread::current().id());
        if let Some(worker) = self.worker.take() {
            if !on_driver {
                let _ = worker.join();
            }
        }
    }
}

fn check_period(period: Duration) -> XenonResult<()> {
    if period.is_zero() {
        return Err(XenonError::invalid_argument(
            "interval period must be greater than zero",
        ));
    }
    Ok(())
}

/// Call `operation` every `period` on a dedicated thread.
pub fn set_async_interval<F>(operation: F, period: Duration) -> XenonResult<Interval>
where
    F: FnMut() + Send + 'static,
{
    Interval::spawn(operation, period)
}

/// Call `operation(args)` every `period` on a dedicated thread. `args` is
/// cloned for every invocation.
pub fn set_async_interval_with<F, Args>(
    mut operation: F,
    period: Duration,
    args: Args,
) -> XenonResult<Interval>
where
    F: CallableMut<Args> + Send + 'static,
    Args: Clone + Send + 'static,
{
    Interval::spawn(
        move || {
            operation.call_mut_with(args.clone());
        },
        period,
    )
}

/// Create an idle inline interval; run it with [`Interval::run_blocking`].
pub fn set_sync_interval<F>(operation: F, period: Duration) -> XenonResult<Interval>
where
    F: FnMut() + Send + 'static,
{
    Interval::inline(operation, period)
}

/// Inline counterpart of [`set_async_interval_with`].
pub fn set_sync_interval_with<F, Args>(
    mut operation: F,
    period: Duration,
    args: Args,
) -> XenonResult<Interval>
where
    F: CallableMut<Args> + Send + 'static,
    Args: Clone + Send + 'static,
{
    Interval::inline(
        move || {
            operation.call_mut_with(args.clone());
        },
        period,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;
    use std::sync::OnceLock;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        (count, move || {
            seen.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_pause_resume_stop_scenario() {
        let (count, tick) = counter();
        let interval = set_async_interval(tick, Duration::from_millis(50)).unwrap();

        thread::sleep(Duration::from_millis(220));
        let after_start = count.load(Ordering::SeqCst);
        assert!(
            (3..=5).contains(&after_start),
            "expected 3..=5 ticks, got {}",
            after_start
        );

        assert_eq!(interval.pause(), IntervalState::Paused);
        let paused_at = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(150));
        assert_eq!(count.load(Ordering::SeqCst), paused_at);

        assert_eq!(interval.resume(), IntervalState::Running);
        thread::sleep(Duration::from_millis(160));
        assert!(count.load(Ordering::SeqCst) > paused_at);

        assert_eq!(interval.stop(), IntervalState::Stopped);
        let stopped_at = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(200));
        assert_eq!(count.load(Ordering::SeqCst), stopped_at);
        assert_eq!(interval.ticks(), stopped_at as u64);
    }

    #[test]
    fn test_stop_is_idempotent_and_terminal() {
        let (count, tick) = counter();
        let interval = set_async_interval(tick, Duration::from_millis(10)).unwrap();

        assert_eq!(interval.stop(), IntervalState::Stopped);
        assert_eq!(interval.stop(), IntervalState::Stopped);
        assert_eq!(interval.pause(), IntervalState::Stopped);
        assert_eq!(interval.resume(), IntervalState::Stopped);

        let stopped_at = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(60));
        assert_eq!(count.load(Ordering::SeqCst), stopped_at);
        assert_eq!(interval.state(), IntervalState::Stopped);
    }

    #[test]
    fn test_stop_wakes_loop_immediately() {
        let (_count, tick) = counter();
        let interval = set_async_interval(tick, Duration::from_secs(30)).unwrap();

        let started = Instant::now();
        interval.stop();
        drop(interval);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_zero_period_rejected() {
        let (_count, tick) = counter();
        let err = set_async_interval(tick, Duration::ZERO).unwrap_err();
        assert_eq!(err.kind(), "Invalid Argument");

        let (_count, tick) = counter();
        assert!(set_sync_interval(tick, Duration::ZERO).is_err());
    }

    #[test]
    fn test_sync_interval_construction_does_not_block() {
        let (count, tick) = counter();
        let started = Instant::now();
        let interval = set_sync_interval(tick, Duration::from_millis(20)).unwrap();

        assert!(started.elapsed() < Duration::from_millis(20));
        assert_eq!(interval.mode(), IntervalMode::Inline);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_run_blocking_until_stopped_elsewhere() {
        let (count, tick) = counter();
        let interval = set_sync_interval(tick, Duration::from_millis(20)).unwrap();

        let controller = interval.controller();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(110));
            controller.stop();
        });

        let started = Instant::now();
        interval.run_blocking().unwrap();
        assert!(started.elapsed() >= Duration::from_millis(110));
        stopper.join().unwrap();

        let ticks = count.load(Ordering::SeqCst);
        assert!((3..=6).contains(&ticks), "got {} ticks", ticks);

        let err = interval.run_blocking().unwrap_err();
        assert_eq!(err.message(), "interval loop has already been run");
    }

    #[test]
    fn test_run_blocking_after_stop_returns() {
        let (count, tick) = counter();
        let interval = set_sync_interval(tick, Duration::from_millis(10)).unwrap();
        interval.stop();
        interval.run_blocking().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_run_blocking_rejected_for_dedicated() {
        let (_count, tick) = counter();
        let interval = set_async_interval(tick, Duration::from_millis(10)).unwrap();
        assert!(interval.run_blocking().is_err());
    }

    #[test]
    fn test_interval_with_arguments() {
        let total = Arc::new(AtomicUsize::new(0));
        let interval = set_async_interval_with(
            |sink: Arc<AtomicUsize>, step: usize| {
                sink.fetch_add(step, Ordering::SeqCst);
            },
            Duration::from_millis(15),
            (Arc::clone(&total), 10),
        )
        .unwrap();

        thread::sleep(Duration::from_millis(100));
        interval.stop();
        let value = total.load(Ordering::SeqCst);
        assert!(value >= 20 && value % 10 == 0, "got {}", value);
    }

    #[test]
    fn test_operation_can_stop_itself() {
        let slot: Arc<OnceLock<IntervalController>> = Arc::new(OnceLock::new());
        let (count, mut tick) = counter();
        let interval = set_sync_interval_with(
            move |slot: Arc<OnceLock<IntervalController>>| {
                tick();
                if let Some(controller) = slot.get() {
                    controller.stop();
                }
            },
            Duration::from_millis(5),
            (Arc::clone(&slot),),
        )
        .unwrap();
        slot.set(interval.controller()).unwrap();

        interval.run_blocking().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(interval.controller().is_stopped());
    }

    #[test]
    fn test_panicking_operation_stops_interval() {
        let executor = Executor::new(
            crate::async_runtime::ExecutorConfig::new().with_report_panics(false),
        );
        let interval = Interval::spawn_on(
            &executor,
            || panic!("tick failed"),
            Duration::from_millis(10),
        )
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !interval.controller().is_stopped() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(interval.state(), IntervalState::Stopped);
        assert_eq!(interval.ticks(), 0);
    }

    #[test]
    fn test_debug_shows_period_and_state() {
        let (_count, tick) = counter();
        let interval = set_sync_interval(tick, Duration::from_millis(20)).unwrap();
        let rendered = format!("{:?}", interval);
        assert!(rendered.contains("period: 20ms"), "{}", rendered);
        assert!(rendered.contains("mode: Inline"), "{}", rendered);
        assert!(rendered.contains("state: Running"), "{}", rendered);
    }

    #[test]
    fn test_unrepresentable_period_inline_waits_for_stop() {
        let (count, tick) = counter();
        let interval = set_sync_interval(tick, Duration::MAX).unwrap();

        let controller = interval.controller();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            controller.stop();
        });

        assert!(interval.run_blocking().is_ok());
        stopper.join().unwrap();
        assert_eq!(interval.state(), IntervalState::Stopped);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!interval.controller.shared.control.is_poisoned());
        assert_eq!(interval.controller.shared.lock().driver, None);
    }

    #[test]
    fn test_unrepresentable_period_dedicated_keeps_loop_alive() {
        let (count, tick) = counter();
        let interval = set_async_interval(tick, Duration::MAX).unwrap();

        thread::sleep(Duration::from_millis(100));
        assert_eq!(interval.state(), IntervalState::Running);
        let worker = interval.worker.as_ref().unwrap();
        assert!(!worker.is_finished());

        assert_eq!(interval.pause(), IntervalState::Paused);
        assert_eq!(interval.resume(), IntervalState::Running);
        thread::sleep(Duration::from_millis(20));
        assert!(!interval.worker.as_ref().unwrap().is_finished());

        let started = Instant::now();
        interval.stop();
        drop(interval);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_panicking_operation_inline_is_contained() {
        let (count, mut tick) = counter();
        let interval = set_sync_interval(
            move || {
                tick();
                panic!("inline tick failed");
            },
            Duration::from_millis(5),
        )
        .unwrap();

        assert!(interval.run_blocking().is_ok());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(interval.state(), IntervalState::Stopped);
        assert_eq!(interval.ticks(), 0);
        assert!(!interval.controller.shared.control.is_poisoned());
        assert_eq!(interval.controller.shared.lock().driver, None);
        assert_eq!(interval.pause(), IntervalState::Stopped);
    }

    #[test]
    fn test_drop_stops_loop() {
        let (count, tick) = counter();
        let interval = set_async_interval(tick, Duration::from_millis(10)).unwrap();
        thread::sleep(Duration::from_millis(35));
        drop(interval);

        let after_drop = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), after_drop);
    }
}
