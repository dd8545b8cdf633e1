//! Subscriber setup for the registry's structured logs
//!
//! Every event the registry emits uses the `xcomp` target with key/value
//! fields such as `service`, `module` and `error`. This module installs a
//! `tracing-subscriber` formatter for them.
//!
//! # Features
//!
//! - `logging` - Emit events (default)
//! - `logging-json` - JSON output (recommended for production)
//! - `logging-pretty` - Colorful multi-line output (recommended for development)
//!
//! Without `logging-json` or `logging-pretty` the `init*` functions are no-ops.
//!
//! # Example
//!
//! ```rust,ignore
//! use xcomp::logging;
//!
//! logging::init();
//!
//! logging::builder()
//!     .with_level(tracing::Level::TRACE)
//!     .registry_only()
//!     .compact()
//!     .init();
//! ```

use tracing::Level;

/// Target used by every event the registry emits.
pub const TARGET: &str = "xcomp";

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON structured logging (production default)
    #[default]
    Json,
    /// Pretty colorful output (development)
    Pretty,
    /// Compact single-line output
    Compact,
}

/// Builder for the log subscriber
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    target: Option<&'static str>,
    with_file: bool,
    with_line_number: bool,
    with_thread_ids: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Json,
            target: None,
            with_file: false,
            with_line_number: false,
            with_thread_ids: false,
        }
    }
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Only show events from one target
    pub fn with_target_filter(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }

    /// Only show the registry's own events
    pub fn registry_only(self) -> Self {
        self.with_target_filter(TARGET)
    }

    pub fn with_file(mut self) -> Self {
        self.with_file = true;
        self
    }

    pub fn with_line_number(mut self) -> Self {
        self.with_line_number = true;
        self
    }

    /// Include thread IDs, useful when watching concurrent first access
    pub fn with_thread_ids(mut self) -> Self {
        self.with_thread_ids = true;
        self
    }

    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    pub fn compact(mut self) -> Self {
        self.format = LogFormat::Compact;
        self
    }

    /// Directive string handed to `EnvFilter`, e.g. `xcomp=DEBUG`.
    ///
    /// Useful when composing your own subscriber instead of calling `init`.
    pub fn filter_directive(&self) -> String {
        match self.target {
            Some(target) => format!("{}={}", target, self.level),
            None => self.level.to_string(),
        }
    }

    /// Install the subscriber globally.
    ///
    /// Panics if a global subscriber is already set.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) {
        use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

        let base = fmt::layer()
            .with_file(self.with_file)
            .with_line_number(self.with_line_number)
            .with_thread_ids(self.with_thread_ids)
            .with_target(true);

        let layer = match self.format {
            #[cfg(feature = "logging-json")]
            LogFormat::Json => base.json().boxed(),
            // Falls back to the default formatter without logging-json
            #[cfg(not(feature = "logging-json"))]
            LogFormat::Json => base.boxed(),
            LogFormat::Pretty => base.pretty().boxed(),
            LogFormat::Compact => base.compact().boxed(),
        };

        tracing_subscriber::registry()
            .with(EnvFilter::new(self.filter_directive()))
            .with(layer)
            .init();
    }

    /// No-op: requires logging-json or logging-pretty feature
    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) {}
}

/// Create a new logging builder
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Initialize with default settings: JSON if `logging-json` is enabled,
/// otherwise pretty if `logging-pretty` is.
pub fn init() {
    if cfg!(feature = "logging-json") {
        init_json();
    } else {
        init_pretty();
    }
}

/// JSON structured logging at DEBUG
///
/// ```json
/// {"timestamp":"2024-01-01T00:00:00.000Z","level":"DEBUG","fields":{"message":"Registering lazy service (will be created on first access)","service":"Repo"},"target":"xcomp"}
/// ```
pub fn init_json() {
    builder().json().init();
}

/// Human-readable colorful logging at DEBUG
pub fn init_pretty() {
    builder().pretty().init();
}

/// Registry events only, at DEBUG
pub fn init_registry_only() {
    builder().registry_only().init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = LoggingBuilder::default();
        assert_eq!(builder.level, Level::DEBUG);
        assert_eq!(builder.format, LogFormat::Json);
        assert!(builder.target.is_none());
        assert_eq!(builder.filter_directive(), "DEBUG");
    }

    #[test]
    fn test_builder_chain() {
        let builder = LoggingBuilder::new()
            .with_level(Level::TRACE)
            .compact()
            .with_file()
            .with_thread_ids()
            .registry_only();

        assert_eq!(builder.format, LogFormat::Compact);
        assert!(builder.with_file);
        assert!(builder.with_thread_ids);
        assert!(!builder.with_line_number);
        assert_eq!(builder.filter_directive(), "xcomp=TRACE");
    }
}
