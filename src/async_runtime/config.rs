//! Executor configuration
//!
//! Defaults can be overridden through the environment:
//!
//! | Variable              | Meaning                               |
//! |-----------------------|---------------------------------------|
//! | `XENON_THREAD_PREFIX` | prefix of spawned thread names        |
//! | `XENON_STACK_SIZE`    | stack size in bytes for spawned tasks |
//! | `XENON_REPORT_PANICS` | log caught panics (`true`/`false`)    |

use std::env;

use crate::error::XenonError;

/// Prefix used for spawned thread names unless configured otherwise
pub const DEFAULT_THREAD_PREFIX: &str = "xenon-task";

pub const ENV_THREAD_PREFIX: &str = "XENON_THREAD_PREFIX";
pub const ENV_STACK_SIZE: &str = "XENON_STACK_SIZE";
pub const ENV_REPORT_PANICS: &str = "XENON_REPORT_PANICS";

/// Settings applied to every thread an [`Executor`](super::Executor) spawns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Threads are named `<prefix>-<task id>`
    pub thread_name_prefix: String,
    /// Stack size for spawned threads; `None` keeps the platform default
    pub stack_size: Option<usize>,
    /// Log a panic caught inside a task at `error` level
    pub report_panics: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: DEFAULT_THREAD_PREFIX.to_string(),
            stack_size: None,
            report_panics: true,
        }
    }
}

impl ExecutorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    pub fn with_report_panics(mut self, report: bool) -> Self {
        self.report_panics = report;
        self
    }

    /// Build a configuration from the `XENON_*` environment variables.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(prefix) = lookup(ENV_THREAD_PREFIX) {
            let prefix = prefix.trim();
            if prefix.is_empty() {
                warn_invalid(XenonError::config_error(format!(
                    "{} must not be empty",
                    ENV_THREAD_PREFIX
                )));
            } else {
                config.thread_name_prefix = prefix.to_string();
            }
        }

        if let Some(raw) = lookup(ENV_STACK_SIZE) {
            match parse_stack_size(&raw) {
                Ok(bytes) => config.stack_size = Some(bytes),
                Err(err) => warn_invalid(err),
            }
        }

        if let Some(raw) = lookup(ENV_REPORT_PANICS) {
            match parse_flag(ENV_REPORT_PANICS, &raw) {
                Ok(flag) => config.report_panics = flag,
                Err(err) => warn_invalid(err),
            }
        }

        config
    }
}

fn warn_invalid(err: XenonError) {
    tracing::warn!(error = %err, "ignoring executor setting");
}

fn parse_stack_size(raw: &str) -> Result<usize, XenonError> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(XenonError::config_error(format!(
            "{} must be greater than zero",
            ENV_STACK_SIZE
        ))),
        Ok(bytes) => Ok(bytes),
        Err(e) => Err(XenonError::config_error(format!(
            "{}={:?} is not a byte count: {}",
            ENV_STACK_SIZE, raw, e
        ))),
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, XenonError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(XenonError::config_error(format!(
            "{}={:?} is not a boolean",
            key, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ExecutorConfig::from_lookup(|_| None);
        assert_eq!(config, ExecutorConfig::default());
        assert_eq!(config.thread_name_prefix, "xenon-task");
        assert!(config.report_panics);
    }

    #[test]
    fn test_overrides() {
        let config = ExecutorConfig::from_lookup(lookup_from(&[
            (ENV_THREAD_PREFIX, "worker"),
            (ENV_STACK_SIZE, "262144"),
            (ENV_REPORT_PANICS, "off"),
        ]));
        assert_eq!(config.thread_name_prefix, "worker");
        assert_eq!(config.stack_size, Some(262_144));
        assert!(!config.report_panics);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ExecutorConfig::from_lookup(lookup_from(&[
            (ENV_THREAD_PREFIX, "   "),
            (ENV_STACK_SIZE, "lots"),
            (ENV_REPORT_PANICS, "maybe"),
        ]));
        assert_eq!(config, ExecutorConfig::default());
    }

    #[test]
    fn test_zero_stack_size_rejected() {
        let err = parse_stack_size("0").unwrap_err();
        assert_eq!(err.kind(), "Config Error");
    }

    #[test]
    fn test_builder() {
        let config = ExecutorConfig::new()
            .with_thread_name_prefix("tick")
            .with_stack_size(64 * 1024)
            .with_report_panics(false);
        assert_eq!(config.thread_name_prefix, "tick");
        assert_eq!(config.stack_size, Some(65_536));
        assert!(!config.report_panics);
    }
}
