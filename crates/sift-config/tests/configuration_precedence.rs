//! Precedence between defaults, the configuration file, the environment, and
//! command-line flags.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use ortho_config::{OrthoConfig, OrthoError};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use sift_config::{
    CONFIG_PATH_ENV, Config, DEFAULT_LOG_FILTER, DEFER_UNKNOWN_PREDICATES_ENV, LOG_FILTER_ENV,
    LOG_FORMAT_ENV, LogFormat, MATCH_LIMIT_ENV,
};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const SIFT_VARIABLES: [&str; 5] = [
    CONFIG_PATH_ENV,
    LOG_FILTER_ENV,
    LOG_FORMAT_ENV,
    MATCH_LIMIT_ENV,
    DEFER_UNKNOWN_PREDICATES_ENV,
];

/// Serialises access to the process environment and restores every `SIFT_*`
/// variable when dropped.
struct Harness {
    temp_dir: TempDir,
    args: Vec<OsString>,
    saved: Vec<(&'static str, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl Harness {
    fn new() -> Self {
        let guard = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        let saved = SIFT_VARIABLES
            .iter()
            .map(|&key| (key, std::env::var_os(key)))
            .collect();
        for key in SIFT_VARIABLES {
            // Environment mutation is unsafe under edition 2024; the mutex
            // keeps other tests in this binary from observing it.
            unsafe { std::env::remove_var(key) };
        }
        Self {
            temp_dir,
            args: vec![OsString::from("sift")],
            saved,
            _guard: guard,
        }
    }

    fn write_config(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Err(error) = fs::write(&path, contents) {
            panic!("failed to write configuration: {error}");
        }
        path
    }

    fn set_env(&self, key: &str, value: impl AsRef<std::ffi::OsStr>) {
        unsafe { std::env::set_var(key, value) };
    }

    fn push_args<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
    }

    fn load(&self) -> Result<Config, std::sync::Arc<OrthoError>> {
        Config::load_from_iter(self.args.clone())
    }

    fn loaded(&self) -> Config {
        self.load()
            .unwrap_or_else(|err| panic!("configuration failed to load: {err}"))
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain(..) {
            match value {
                Some(previous) => unsafe { std::env::set_var(key, previous) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

/// Files named by the error, whether it is a single file error or an
/// aggregate of several.
fn mentioned_paths(error: &OrthoError) -> Vec<PathBuf> {
    match error {
        OrthoError::File { path, .. } => vec![path.clone()],
        OrthoError::Aggregate(aggregate) => aggregate
            .iter()
            .filter_map(|err| match err {
                OrthoError::File { path, .. } => Some(path.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[rstest]
fn defaults_apply_without_any_layer(harness: Harness) {
    let config = harness.loaded();

    assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    assert_eq!(config.log_format, LogFormat::Compact);
    assert_eq!(config.match_limit, None);
    assert!(!config.defer_unknown_predicates);
}

#[rstest]
fn file_values_override_defaults(mut harness: Harness) {
    let path = harness.write_config(
        "sift.toml",
        "log_filter = \"debug\"\nlog_format = \"json\"\nmatch_limit = 64\n",
    );
    harness.push_args([OsString::from("--config-path"), path.into_os_string()]);

    let config = harness.loaded();
    assert_eq!(config.log_filter, "debug");
    assert_eq!(config.log_format, LogFormat::Json);
    assert_eq!(config.match_limit, Some(64));
}

#[rstest]
fn environment_selects_the_file_when_no_flag_is_given(harness: Harness) {
    let path = harness.write_config("env.toml", "defer_unknown_predicates = true\n");
    harness.set_env(CONFIG_PATH_ENV, &path);

    assert!(harness.loaded().defer_unknown_predicates);
}

#[rstest]
fn environment_overrides_file_and_flags_override_environment(mut harness: Harness) {
    let path = harness.write_config(
        "sift.toml",
        "log_filter = \"info\"\nlog_format = \"compact\"\nmatch_limit = 8\n",
    );
    harness.set_env(LOG_FILTER_ENV, "trace");
    harness.set_env(LOG_FORMAT_ENV, "json");
    harness.set_env(MATCH_LIMIT_ENV, "16");
    harness.push_args([OsString::from("--config-path"), path.into_os_string()]);
    harness.push_args(["--match-limit", "32"]);

    let config = harness.loaded();
    assert_eq!(config.log_filter, "trace");
    assert_eq!(config.log_format, LogFormat::Json);
    assert_eq!(config.match_limit, Some(32));
}

#[rstest]
fn malformed_file_reports_its_path(mut harness: Harness) {
    let path = harness.write_config("broken.toml", "match_limit = \"many\"\n");
    harness.push_args([OsString::from("--config-path"), path.clone().into_os_string()]);

    let Err(error) = harness.load() else {
        panic!("malformed configuration should fail");
    };
    assert!(
        mentioned_paths(&error).contains(&path),
        "expected {path:?} in {error:?}"
    );
}

#[rstest]
fn missing_file_fails_to_load(mut harness: Harness) {
    harness.push_args(["--config-path", "/nonexistent/sift.toml"]);

    assert!(harness.load().is_err());
}
