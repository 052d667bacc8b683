use crate::logging::LogFormat;

/// Environment variable naming a configuration file.
pub const CONFIG_PATH_ENV: &str = "SIFT_CONFIG_PATH";

/// Environment variable overriding the log filter.
pub const LOG_FILTER_ENV: &str = "SIFT_LOG_FILTER";

/// Environment variable overriding the log format.
pub const LOG_FORMAT_ENV: &str = "SIFT_LOG_FORMAT";

/// Environment variable overriding the cursor match limit.
pub const MATCH_LIMIT_ENV: &str = "SIFT_MATCH_LIMIT";

/// Environment variable enabling deferred unknown predicate operators.
pub const DEFER_UNKNOWN_PREDICATES_ENV: &str = "SIFT_DEFER_UNKNOWN_PREDICATES";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
