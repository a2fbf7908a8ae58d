//! Error handling and diagnostics for Xenon
//!
//! Spawned tasks never unwind into the caller. Whatever goes wrong inside
//! them is converted into a [`XenonError`] and either logged or delivered
//! through a task handle.

use std::fmt;
use std::time::Duration;

pub mod diagnostic;

pub use diagnostic::Diagnostic;

/// Result type alias for Xenon operations
pub type XenonResult<T> = Result<T, XenonError>;

/// Main error type for Xenon
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XenonError {
    /// The operation panicked inside its thread
    TaskPanicked {
        task: String,
        message: String,
    },
    /// The operation returned an error value
    TaskFailed {
        task: String,
        message: String,
    },
    /// The OS refused to create a thread
    SpawnFailed {
        message: String,
    },
    /// A bounded wait on a task handle expired
    TimedOut {
        task: String,
        waited: Duration,
    },
    /// The task went away without reporting an outcome
    Disconnected {
        task: String,
    },
    /// An argument was rejected before any work started
    InvalidArgument {
        message: String,
    },
    /// Configuration could not be parsed
    ConfigError {
        message: String,
    },
}

impl XenonError {
    /// Create a new panic error
    pub fn task_panicked(task: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TaskPanicked {
            task: task.into(),
            message: message.into(),
        }
    }

    /// Create a new task failure error
    pub fn task_failed(task: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TaskFailed {
            task: task.into(),
            message: message.into(),
        }
    }

    /// Create a new spawn error
    pub fn spawn_failed(message: impl Into<String>) -> Self {
        Self::SpawnFailed {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timed_out(task: impl Into<String>, waited: Duration) -> Self {
        Self::TimedOut {
            task: task.into(),
            waited,
        }
    }

    /// Create a new disconnect error
    pub fn disconnected(task: impl Into<String>) -> Self {
        Self::Disconnected { task: task.into() }
    }

    /// Create a new invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Get the error kind as a string
    pub fn kind(&self) -> &str {
        match self {
            Self::TaskPanicked { .. } => "Task Panicked",
            Self::TaskFailed { .. } => "Task Failed",
            Self::SpawnFailed { .. } => "Spawn Failed",
            Self::TimedOut { .. } => "Timed Out",
            Self::Disconnected { .. } => "Disconnected",
            Self::InvalidArgument { .. } => "Invalid Argument",
            Self::ConfigError { .. } => "Config Error",
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::TaskPanicked { message, .. }
            | Self::TaskFailed { message, .. }
            | Self::SpawnFailed { message }
            | Self::InvalidArgument { message }
            | Self::ConfigError { message } => message.clone(),
            Self::TimedOut { waited, .. } => {
                format!("no outcome after {}ms", waited.as_millis())
            }
            Self::Disconnected { .. } => "task ended without reporting an outcome".to_string(),
        }
    }

    /// Get the name of the task involved, if any
    pub fn task(&self) -> Option<&str> {
        match self {
            Self::TaskPanicked { task, .. }
            | Self::TaskFailed { task, .. }
            | Self::TimedOut { task, .. }
            | Self::Disconnected { task } => Some(task),
            Self::SpawnFailed { .. } | Self::InvalidArgument { .. } | Self::ConfigError { .. } => {
                None
            }
        }
    }

    /// Whether the error came from the operation itself rather than the launcher
    pub fn is_task_failure(&self) -> bool {
        matches!(self, Self::TaskPanicked { .. } | Self::TaskFailed { .. })
    }
}

impl fmt::Display for XenonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(task) = self.task() {
            write!(f, "{}: {} in {}", self.kind(), self.message(), task)
        } else {
            write!(f, "{}: {}", self.kind(), self.message())
        }
    }
}

impl std::error::Error for XenonError {}
