//! `tracing-subscriber` setup.
//!
//! The routing crates only emit `tracing` events. A host that wants them on
//! stdout calls [`init_logging`] once at startup.
//!
//! ```rust,ignore
//! use trellis_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(routes = 12, "route table frozen");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// How events are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line, human-oriented.
    Pretty,
    /// One terse line per event.
    Compact,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// When false, [`init_logging`] installs nothing.
    pub enabled: bool,
    /// An `EnvFilter` directive such as `"info"` or `"trellis=debug,warn"`.
    pub filter: String,
    /// Output format.
    pub output: LogOutput,
    /// Include source file and line.
    pub with_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Pretty output at `debug`, with source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            filter: "debug".to_string(),
            output: LogOutput::Pretty,
            with_location: true,
        }
    }

    /// JSON output at `info`.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            filter: "info".to_string(),
            output: LogOutput::Json,
            with_location: false,
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] for a bad directive and
/// [`TelemetryError::LoggingInit`] when a global subscriber already exists.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.filter)?;
    let fmt = tracing_subscriber::fmt::layer()
        .with_file(config.with_location)
        .with_line_number(config.with_location);

    let output: Box<dyn Layer<Registry> + Send + Sync> = match config.output {
        LogOutput::Json => fmt.json().boxed(),
        LogOutput::Pretty => fmt.pretty().boxed(),
        LogOutput::Compact => fmt.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(output.with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Parses an `EnvFilter` directive.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] if the directive does not parse.
pub fn create_env_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| TelemetryError::InvalidFilter {
        filter: directive.to_string(),
        reason: e.to_string(),
    })
}

/// Field names shared by routing log events.
pub mod fields {
    /// Request verb.
    pub const HTTP_METHOD: &str = "http.method";
    /// Request or route path.
    pub const HTTP_PATH: &str = "http.path";
    /// Route name.
    pub const ROUTE: &str = "route";
    /// Container key.
    pub const KEY: &str = "key";
    /// Slice name.
    pub const SLICE: &str = "slice";
    /// Middleware identifier.
    pub const MIDDLEWARE: &str = "middleware";
    /// Machine-readable error code.
    pub const ERROR_CODE: &str = "error.code";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(LogConfig::default(), LogConfig::production());
        assert_eq!(LogConfig::production().output, LogOutput::Json);

        let dev = LogConfig::development();
        assert_eq!(dev.output, LogOutput::Pretty);
        assert_eq!(dev.filter, "debug");
        assert!(dev.with_location);
    }

    #[test]
    fn test_filter_directives() {
        assert!(create_env_filter("trellis=debug,warn").is_ok());
        assert!(matches!(
            create_env_filter("trellis=loud"),
            Err(TelemetryError::InvalidFilter { ref filter, .. }) if filter == "trellis=loud"
        ));
    }

    #[test]
    fn test_disabled_skips_filter_parsing() {
        let config = LogConfig {
            enabled: false,
            filter: "not a filter [".to_string(),
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_ok());
    }
}
