//! Where datasets come from.
//!
//! The predicted slot is a single file overwritten by every prediction run.
//! When it is absent the bundled sample file stands in. Every `load` reads
//! from disk again, so two calls may see different data.

use crate::error::SourceError;
use crate::loader::{load_dataset, LoadReport};
use crate::types::Dataset;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Which file a dataset was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Predicted,
    Sample,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Predicted => write!(f, "predicted"),
            Origin::Sample => write!(f, "sample"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub dataset: Dataset,
    pub report: LoadReport,
    pub origin: Origin,
    pub path: PathBuf,
}

pub trait DatasetSource {
    /// The current dataset, or `SourceError::NotFound` when there is none.
    fn load(&self) -> Result<Loaded, SourceError>;

    /// Historical data to compare predictions against, if any.
    fn baseline(&self) -> Option<Dataset>;
}

#[derive(Debug, Clone)]
pub struct FileSource {
    pub predicted: PathBuf,
    pub sample: PathBuf,
}

impl FileSource {
    pub fn new(predicted: impl Into<PathBuf>, sample: impl Into<PathBuf>) -> Self {
        Self {
            predicted: predicted.into(),
            sample: sample.into(),
        }
    }

    fn read(path: &Path, origin: Origin) -> Result<Loaded, SourceError> {
        let (dataset, report) = load_dataset(path)?;
        Ok(Loaded {
            dataset,
            report,
            origin,
            path: path.to_path_buf(),
        })
    }
}

impl DatasetSource for FileSource {
    fn load(&self) -> Result<Loaded, SourceError> {
        if self.predicted.is_file() {
            info!(path = %self.predicted.display(), "using predicted dataset");
            return Self::read(&self.predicted, Origin::Predicted);
        }
        if self.sample.is_file() {
            warn!(
                predicted = %self.predicted.display(),
                sample = %self.sample.display(),
                "no predicted dataset yet, falling back to sample"
            );
            return Self::read(&self.sample, Origin::Sample);
        }
        Err(SourceError::NotFound {
            predicted: self.predicted.clone(),
            fallback: self.sample.clone(),
        })
    }

    fn baseline(&self) -> Option<Dataset> {
        if !self.sample.is_file() {
            return None;
        }
        match load_dataset(&self.sample) {
            Ok((dataset, _)) => Some(dataset),
            Err(e) => {
                warn!(error = %e, "baseline sample could not be loaded");
                None
            }
        }
    }
}
