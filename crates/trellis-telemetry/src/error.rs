//! Setup failures.

use thiserror::Error;

/// Why a subscriber could not be installed.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber is already in place.
    #[error("subscriber already installed: {0}")]
    LoggingInit(String),

    /// The `EnvFilter` directive did not parse.
    #[error("log filter {filter:?} rejected: {reason}")]
    InvalidFilter {
        /// Directive as given.
        filter: String,
        /// What the parser said.
        reason: String,
    },
}
