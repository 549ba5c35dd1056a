//! Errors raised at the dataset and predictor boundaries.
//!
//! The aggregation core never fails on data quality; these only cover
//! getting a dataset into memory in the first place.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single row was dropped while loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("required field `{0}` is empty")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum SourceError {
    /// Neither the predicted slot nor the fallback sample exists.
    #[error("no dataset available: neither {predicted} nor {fallback} exists")]
    NotFound {
        predicted: PathBuf,
        fallback: PathBuf,
    },

    #[error("dataset is missing required columns: {0}")]
    MissingColumns(String),

    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read dataset: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("input file {0} does not exist")]
    MissingInput(PathBuf),

    #[error("could not start predictor `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("predictor exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("predictor finished but wrote no output at {0}")]
    MissingOutput(PathBuf),

    #[error("could not prepare output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not move prediction into {path}: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Load(#[from] SourceError),
}
