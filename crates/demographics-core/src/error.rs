// crates/demographics-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("source '{}' could not be opened: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source '{}' is not valid delimited text: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("source '{}' has no header row", .path.display())]
    MissingHeader { path: PathBuf },

    #[error("column '{raw}' has no alphanumeric characters left after cleaning")]
    EmptyColumnName { raw: String },

    #[error("columns '{first}' and '{second}' both normalize to '{column}'")]
    ColumnCollision {
        column: String,
        first: String,
        second: String,
    },

    #[error("required column '{column}' is missing")]
    MissingColumn { column: String },

    #[error("aggregation column '{column}' is not numeric")]
    NonNumericColumn { column: String },

    #[error("no aggregation columns were configured")]
    EmptyAggregation,

    #[error("column '{column}' has no values to impute from")]
    NoImputationSource { column: String },

    #[error("state '{value}' has no entry in the state map")]
    UnmappedState { value: String },

    #[error("state '{value}' would be labelled '{label}', which is reserved for the national total")]
    ReservedStateLabel { value: String, label: String },

    #[error("destination '{}' could not be written: {source}", .path.display())]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
