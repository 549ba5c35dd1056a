//! Runs the external prediction model.
//!
//! The model is a separate program invoked as
//! `<program> <script> <input.csv> <output.csv>`. It writes to a staging file
//! next to the predicted slot; the slot is only replaced once that file has
//! loaded cleanly, so a failed run leaves the previous prediction in place.

use crate::error::PredictError;
use crate::loader::{load_dataset, LoadReport};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct Predictor {
    pub program: String,
    pub script: Option<PathBuf>,
    pub output: PathBuf,
}

impl Predictor {
    pub fn run(&self, input: &Path) -> Result<LoadReport, PredictError> {
        if !input.is_file() {
            return Err(PredictError::MissingInput(input.to_path_buf()));
        }
        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PredictError::OutputDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let staging = self.staging_path();
        discard(&staging)?;

        let report = match self.predict_into(input, &staging) {
            Ok(report) => report,
            Err(e) => {
                if let Err(cleanup) = discard(&staging) {
                    warn!(error = %cleanup, "staging file left behind");
                }
                return Err(e);
            }
        };
        fs::rename(&staging, &self.output).map_err(|source| PredictError::Replace {
            path: self.output.clone(),
            source,
        })?;

        info!(
            input = %input.display(),
            output = %self.output.display(),
            rows = report.loaded_rows,
            "prediction finished"
        );
        Ok(report)
    }

    /// `.<slot name>.tmp` in the slot's directory, so the final rename never
    /// crosses filesystems.
    fn staging_path(&self) -> PathBuf {
        let mut name = OsString::from(".");
        name.push(self.output.file_name().unwrap_or(OsStr::new("predicted.csv")));
        name.push(".tmp");
        self.output.with_file_name(name)
    }

    fn predict_into(&self, input: &Path, staging: &Path) -> Result<LoadReport, PredictError> {
        let mut cmd = Command::new(&self.program);
        if let Some(script) = &self.script {
            cmd.arg(script);
        }
        cmd.arg(input).arg(staging);
        debug!(?cmd, "spawning predictor");

        let out = cmd.output().map_err(|source| PredictError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        if !out.status.success() {
            return Err(PredictError::Failed {
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        if !staging.is_file() {
            return Err(PredictError::MissingOutput(staging.to_path_buf()));
        }

        let (_, report) = load_dataset(staging)?;
        Ok(report)
    }
}

fn discard(path: &Path) -> Result<(), PredictError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(PredictError::Replace {
            path: path.to_path_buf(),
            source,
        }),
    }
}
