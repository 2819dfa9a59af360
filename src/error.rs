//! Pipeline error taxonomy
//!
//! Every stage raises one of these variants. They travel inside an
//! [`eyre::Report`] so callers can add context freely and still recover the
//! kind with `report.downcast_ref::<PipelineError>()`.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`PipelineError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileNotFound,
    Parse,
    Storage,
    Query,
    Io,
    Config,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::FileNotFound => "FileNotFoundError",
            ErrorKind::Parse => "ParseError",
            ErrorKind::Storage => "StorageError",
            ErrorKind::Query => "QueryError",
            ErrorKind::Io => "IOError",
            ErrorKind::Config => "ConfigError",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input file does not exist
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The input file is not well-formed CSV
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// A table could not be created in the store
    #[error("cannot create table '{table}': {message}")]
    Storage { table: String, message: String },

    /// An aggregation query could not be executed
    #[error("query '{query}' failed: {message}")]
    Query { query: String, message: String },

    /// Reading or writing a file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The pipeline configuration is invalid
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::FileNotFound(_) => ErrorKind::FileNotFound,
            PipelineError::Parse { .. } => ErrorKind::Parse,
            PipelineError::Storage { .. } => ErrorKind::Storage,
            PipelineError::Query { .. } => ErrorKind::Query,
            PipelineError::Io { .. } => ErrorKind::Io,
            PipelineError::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn storage(table: &str, message: impl Into<String>) -> Self {
        PipelineError::Storage {
            table: table.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn query(query: &str, message: impl Into<String>) -> Self {
        PipelineError::Query {
            query: query.to_string(),
            message: message.into(),
        }
    }
}

/// Find the [`ErrorKind`] of the first typed pipeline error in a report
pub fn error_kind(report: &eyre::Report) -> Option<ErrorKind> {
    report
        .chain()
        .find_map(|cause| cause.downcast_ref::<PipelineError>())
        .map(PipelineError::kind)
}
