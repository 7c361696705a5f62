use std::path::PathBuf;

use thiserror::Error;

/// Failure looking up or decoding a column of a [`crate::result_table::ResultTable`].
#[derive(Debug, Error, PartialEq)]
pub enum ColumnError {
    #[error("missing column `{0}`")]
    Missing(String),
    #[error("column `{column}` row {row}: expected a number")]
    NotNumeric { column: String, row: usize },
    #[error("column `{column}` row {row}: expected text")]
    NotText { column: String, row: usize },
    #[error("column `{column}`: expected {expected} values, got {actual}")]
    Length {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// The match database could not be read. Always fatal for a report run.
#[derive(Debug, Error)]
pub enum DataAccessError {
    #[error("open sqlite db {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} already exists; pass --force to replace it")]
    Exists { path: PathBuf },
    #[error("remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("sqlite db {path} has no `{table}` table")]
    MissingTable { path: PathBuf, table: &'static str },
    #[error("query `{label}` failed: {source}")]
    Query {
        label: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    #[error("query `{label}` returned an unexpected shape: {source}")]
    Decode {
        label: &'static str,
        #[source]
        source: ColumnError,
    },
}

/// A single chart could not be produced.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{chart}: {source}")]
    Column {
        chart: &'static str,
        #[source]
        source: ColumnError,
    },
    #[error("{chart}: no rows to plot")]
    Empty { chart: &'static str },
    #[error("{chart}: no usable font ({message})")]
    Font {
        chart: &'static str,
        message: String,
    },
    #[error("{chart}: drawing failed: {message}")]
    Draw {
        chart: &'static str,
        message: String,
    },
    #[error("{chart}: write {path}: {source}")]
    Io {
        chart: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    pub fn chart(&self) -> &'static str {
        match self {
            RenderError::Column { chart, .. }
            | RenderError::Empty { chart }
            | RenderError::Font { chart, .. }
            | RenderError::Draw { chart, .. }
            | RenderError::Io { chart, .. } => chart,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    DataAccess(#[from] DataAccessError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
