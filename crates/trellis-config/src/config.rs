//! Top-level configuration type.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingConfig, RoutingConfig};

/// Complete Trellis configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use trellis_config::TrellisConfig;
///
/// let config = TrellisConfig::default();
/// assert!(config.routing.verify_on_boot);
/// assert_eq!(config.routing.action_key_namespace, "actions");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TrellisConfig {
    /// Routing configuration.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TrellisConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if:
    /// - `routing.base_url` is not an absolute http(s) URL
    /// - `routing.action_key_namespace` is empty or contains a `.`
    /// - `logging.level` is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = &self.routing.base_url;
        let host = base
            .strip_prefix("http://")
            .or_else(|| base.strip_prefix("https://"));
        if host.map_or(true, str::is_empty) {
            return Err(ConfigError::invalid(
                "routing.base_url",
                format!("expected an absolute http(s) URL, got {base:?}"),
            ));
        }

        let namespace = &self.routing.action_key_namespace;
        if namespace.is_empty() || namespace.contains('.') {
            return Err(ConfigError::invalid(
                "routing.action_key_namespace",
                "must be a single non-empty key segment",
            ));
        }

        if self.logging.enabled {
            trellis_telemetry::logging::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Development preset: pretty debug logs with source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            routing: RoutingConfig::default(),
            logging: LoggingConfig {
                enabled: true,
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                include_location: true,
            },
        }
    }

    /// Production preset: JSON logs at info level.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }
}
