//! Logging and metrics for the Trellis routing core.
//!
//! The routing crates emit `tracing` events and `metrics` counters. This
//! crate names them and, for hosts that want it, installs a subscriber:
//!
//! ```rust,ignore
//! use trellis_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production())?;
//! trellis_telemetry::metrics::describe_metrics();
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogOutput};
pub use metrics::ResolutionOutcome;

/// Result alias for telemetry setup.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
