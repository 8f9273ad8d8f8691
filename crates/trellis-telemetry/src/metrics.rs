//! Routing metrics.
//!
//! Counters are emitted through the `metrics` facade. Installing a recorder
//! or exporter is left to the host; without one every call is a no-op.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `trellis_route_not_found_total` | Counter | `method` | Requests that matched no path |
//! | `trellis_route_method_not_allowed_total` | Counter | `method` | Path matched, verb did not |
//! | `trellis_endpoint_resolutions_total` | Counter | `outcome` | Lazy endpoint resolutions |

use metrics::{counter, describe_counter};

/// Requests whose path matched no route.
pub const ROUTE_NOT_FOUND_TOTAL: &str = "trellis_route_not_found_total";

/// Requests whose path matched but whose verb did not.
pub const ROUTE_METHOD_NOT_ALLOWED_TOTAL: &str = "trellis_route_method_not_allowed_total";

/// Lazy endpoint resolutions, labelled by outcome.
pub const ENDPOINT_RESOLUTIONS_TOTAL: &str = "trellis_endpoint_resolutions_total";

/// Result of resolving a route target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The target produced a callable endpoint.
    Resolved,
    /// Resolution failed for the first time.
    Failed,
    /// A previously failed endpoint was called again.
    Replayed,
}

impl ResolutionOutcome {
    /// Label value for the `outcome` label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::Failed => "failed",
            Self::Replayed => "replayed",
        }
    }
}

/// Registers descriptions for the routing metrics with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(ROUTE_NOT_FOUND_TOTAL, "Requests that matched no route");
    describe_counter!(
        ROUTE_METHOD_NOT_ALLOWED_TOTAL,
        "Requests whose path matched a route but whose method did not"
    );
    describe_counter!(
        ENDPOINT_RESOLUTIONS_TOTAL,
        "Lazy endpoint resolutions by outcome"
    );
}

/// Records a request that matched no route.
pub fn record_not_found(method: &str) {
    counter!(ROUTE_NOT_FOUND_TOTAL, "method" => method.to_string()).increment(1);
}

/// Records a request rejected with 405.
pub fn record_method_not_allowed(method: &str) {
    counter!(ROUTE_METHOD_NOT_ALLOWED_TOTAL, "method" => method.to_string()).increment(1);
}

/// Records a lazy endpoint resolution.
pub fn record_resolution(outcome: ResolutionOutcome) {
    counter!(ENDPOINT_RESOLUTIONS_TOTAL, "outcome" => outcome.as_str()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert_eq!(ROUTE_NOT_FOUND_TOTAL, "trellis_route_not_found_total");
        assert!(ENDPOINT_RESOLUTIONS_TOTAL.starts_with("trellis_"));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(ResolutionOutcome::Resolved.as_str(), "resolved");
        assert_eq!(ResolutionOutcome::Failed.as_str(), "failed");
        assert_eq!(ResolutionOutcome::Replayed.as_str(), "replayed");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        describe_metrics();
        record_not_found("GET");
        record_method_not_allowed("DELETE");
        record_resolution(ResolutionOutcome::Resolved);
    }
}
