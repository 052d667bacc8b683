//! Configuration for the sift command-line tool.
//!
//! [`Config`] derives `OrthoConfig`, which layers values from lowest to
//! highest precedence:
//!
//! 1. built-in defaults ([`default_log_filter`], [`default_log_format`]);
//! 2. a TOML file named by `--config-path`, or else by `$SIFT_CONFIG_PATH`;
//! 3. `SIFT_*` environment variables such as `SIFT_LOG_FILTER`;
//! 4. command-line flags such as `--log-filter`.
//!
//! ```toml
//! log_filter = "sift_query=debug"
//! log_format = "json"
//! match_limit = 256
//! defer_unknown_predicates = false
//! ```

mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use sift_query::QueryOptions;

pub use defaults::{
    CONFIG_PATH_ENV, DEFAULT_LOG_FILTER, DEFER_UNKNOWN_PREDICATES_ENV, LOG_FILTER_ENV,
    LOG_FORMAT_ENV, MATCH_LIMIT_ENV, default_log_filter, default_log_filter_string,
    default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "SIFT_")]
pub struct Config {
    /// `tracing` filter directive, in `RUST_LOG` syntax.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format of log records.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Maximum number of in-progress matches the cursor may track.
    #[serde(default)]
    pub match_limit: Option<u32>,
    /// Keep unknown predicate operators until evaluation instead of failing
    /// compilation.
    #[serde(default)]
    #[ortho_config(default = false)]
    pub defer_unknown_predicates: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            match_limit: None,
            defer_unknown_predicates: false,
        }
    }
}

impl Config {
    /// Options for compiling and enumerating queries.
    #[must_use]
    pub const fn query_options(&self) -> QueryOptions {
        QueryOptions::new(self.match_limit, self.defer_unknown_predicates)
    }
}
