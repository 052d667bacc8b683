//! Error type for the CLI runtime.

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to read {path}: {source}")]
    ReadInput { path: Utf8PathBuf, source: io::Error },
    #[error("{path}: {source}")]
    Query {
        path: Utf8PathBuf,
        source: sift_query::QueryError,
    },
    #[error(transparent)]
    Evaluation(#[from] sift_query::EvaluationError),
    #[error("failed to write output: {0}")]
    WriteOutput(#[from] io::Error),
}
