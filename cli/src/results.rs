//! Result tables
//!
//! One CSV file per policy, profile pair and traffic class:
//! `<results_dir>/<POLICY>/<reliability>_<deadline>_<CLASS>.csv`. Each run
//! appends one row; the header is written only when the file is created.

use pilot_simulator_core_rs::models::TrafficClass;
use pilot_simulator_core_rs::reporting::RunSummary;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResultsError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write row to {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// One line of a result table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    #[serde(rename = "population_A")]
    pub population_a: usize,
    #[serde(rename = "population_B")]
    pub population_b: usize,
    pub mean_wait: f64,
    pub variance: f64,
    #[serde(rename = "upper_CI")]
    pub upper_ci: f64,
    #[serde(rename = "lower_CI")]
    pub lower_ci: f64,
    pub loss_rate: f64,
}

impl ResultRow {
    pub fn from_summary(summary: &RunSummary, class: TrafficClass) -> Self {
        let outcome = &summary.classes[class];
        Self {
            population_a: summary.populations.a,
            population_b: summary.populations.b,
            mean_wait: outcome.wait.mean,
            variance: outcome.wait.variance,
            upper_ci: outcome.wait.upper_ci,
            lower_ci: outcome.wait.lower_ci,
            loss_rate: outcome.loss_rate,
        }
    }
}

/// Table file for one class of a run
pub fn result_path(results_dir: &Path, summary: &RunSummary, class: TrafficClass) -> PathBuf {
    results_dir.join(&summary.policy).join(format!(
        "{}_{}_{}.csv",
        summary.reliability_profile,
        summary.deadline_profile,
        class.label()
    ))
}

/// Append `row` to the table at `path`, creating it with a header if needed
pub fn append_row(path: &Path, row: &ResultRow) -> Result<(), ResultsError> {
    let io_error = |source| ResultsError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let is_new = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_error)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);
    writer.serialize(row).map_err(|source| ResultsError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_error)
}

/// Append the rows of both classes; returns the files written
pub fn write_results(results_dir: &Path, summary: &RunSummary) -> Result<Vec<PathBuf>, ResultsError> {
    TrafficClass::ALL
        .into_iter()
        .map(|class| {
            let path = result_path(results_dir, summary, class);
            append_row(&path, &ResultRow::from_summary(summary, class))?;
            Ok(path)
        })
        .collect()
}
