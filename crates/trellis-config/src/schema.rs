//! Configuration section types.

use serde::{Deserialize, Serialize};
use trellis_telemetry::logging::{LogConfig, LogOutput};

/// Routing configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Check every container-key target against a booted registry when the
    /// route table is frozen.
    #[serde(default = "default_true")]
    pub verify_on_boot: bool,

    /// Leading segment of generated container keys.
    #[serde(default = "default_action_key_namespace")]
    pub action_key_namespace: String,

    /// Base URL used to render absolute route URLs.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            verify_on_boot: true,
            action_key_namespace: default_action_key_namespace(),
            base_url: default_base_url(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_action_key_namespace() -> String {
    "actions".to_string()
}

fn default_base_url() -> String {
    "http://localhost:2300".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
    /// Single-line human-readable format.
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts to the telemetry crate's logging configuration.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            filter: self.level.clone(),
            output: match self.format {
                LogFormat::Json => LogOutput::Json,
                LogFormat::Pretty => LogOutput::Pretty,
                LogFormat::Compact => LogOutput::Compact,
            },
            with_location: self.include_location,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_defaults() {
        let config = RoutingConfig::default();
        assert!(config.verify_on_boot);
        assert_eq!(config.action_key_namespace, "actions");
        assert_eq!(config.base_url, "http://localhost:2300");
    }

    #[test]
    fn test_partial_routing_section_keeps_defaults() {
        let config: RoutingConfig = toml::from_str("verify_on_boot = false").unwrap();
        assert!(!config.verify_on_boot);
        assert_eq!(config.action_key_namespace, "actions");
    }

    #[test]
    fn test_unknown_routing_field_is_rejected() {
        let result: Result<RoutingConfig, _> = toml::from_str("verify = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_deserialize() {
        let format: LogFormat = serde_json::from_str(r#""pretty""#).unwrap();
        assert_eq!(format, LogFormat::Pretty);
        assert!(serde_json::from_str::<LogFormat>(r#""xml""#).is_err());
    }

    #[test]
    fn test_to_log_config() {
        let config = LoggingConfig {
            format: LogFormat::Pretty,
            include_location: true,
            ..LoggingConfig::default()
        };

        let log = config.to_log_config();
        assert_eq!(log.output, LogOutput::Pretty);
        assert!(log.with_location);
        assert_eq!(log.filter, "info");
    }
}
