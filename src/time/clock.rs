//! Stopwatch clock

use std::time::{Duration, Instant};

/// Unit for reading a [`Clock`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeOrder {
    #[default]
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl TimeOrder {
    fn per_second(self) -> f64 {
        match self {
            TimeOrder::Seconds => 1.0,
            TimeOrder::Milliseconds => 1e3,
            TimeOrder::Microseconds => 1e6,
            TimeOrder::Nanoseconds => 1e9,
        }
    }
}

/// Measures elapsed time. Starts when constructed.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
    end: Option<Instant>,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            end: None,
        }
    }

    /// Freeze the measurement at the current instant
    pub fn stop(&mut self) {
        self.end = Some(Instant::now());
    }

    /// Start measuring again from now
    pub fn restart(&mut self) {
        self.start = Instant::now();
        self.end = None;
    }

    pub fn is_stopped(&self) -> bool {
        self.end.is_some()
    }

    /// Time between start and stop, or start and now if still running
    pub fn elapsed(&self) -> Duration {
        self.end
            .unwrap_or_else(Instant::now)
            .saturating_duration_since(self.start)
    }

    /// Elapsed time in the given unit
    pub fn get(&self, order: TimeOrder) -> f64 {
        self.elapsed().as_secs_f64() * order.per_second()
    }
}
