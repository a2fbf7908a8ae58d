//! Diagnostic formatting for better error messages
//!
//! Renders a [`XenonError`] for a terminal, with the failing task and a
//! hint about what the caller can do next.

use super::XenonError;
use colored::Colorize;

/// Diagnostic information for displaying errors with context
pub struct Diagnostic {
    error: XenonError,
    context: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic from an error
    pub fn new(error: XenonError) -> Self {
        Self {
            error,
            context: None,
        }
    }

    /// Create a diagnostic that also names what the caller was doing
    pub fn with_context(error: XenonError, context: &str) -> Self {
        Self {
            error,
            context: Some(context.to_string()),
        }
    }

    /// Format the diagnostic with color and context
    pub fn format(&self) -> String {
        let mut output = String::new();

        let kind = self.error.kind().red().bold();
        output.push_str(&format!("{}: ", kind));
        output.push_str(&self.error.message());
        output.push('\n');

        if let Some(task) = self.error.task() {
            output.push_str(&format!("  {} {}\n", "-->".blue().bold(), task));
        }

        if let Some(ref context) = self.context {
            output.push_str(&format!("  {} while {}\n", "|".blue().bold(), context));
        }

        if let Some(hint) = self.hint() {
            output.push_str(&format!("  {} {}\n", "help:".green().bold(), hint));
        }

        output
    }

    fn hint(&self) -> Option<&'static str> {
        match self.error {
            XenonError::TaskPanicked { .. } => {
                Some("the panic was contained to its thread; other tasks are unaffected")
            }
            XenonError::SpawnFailed { .. } => {
                Some("the process may be out of threads; try a smaller XENON_STACK_SIZE")
            }
            XenonError::TimedOut { .. } => {
                Some("the task is still running; join the handle again to keep waiting")
            }
            XenonError::ConfigError { .. } => {
                Some("check the XENON_* environment variables")
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}
