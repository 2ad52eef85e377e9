//! Final run report and per-record predictions.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::core::dataset::Dataset;
use crate::core::model::LinearModel;
use crate::core::types::StopReason;

/// Metadata for a training run, persisted to `report.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub run_id: String,
    pub input: String,
    /// SHA-256 fingerprint of the input file for reproducibility tracking.
    pub input_sha256: String,
    pub records: usize,
    pub features: usize,
    pub rounds_requested: u32,
    pub rounds_completed: u32,
    pub start_time: String,
    pub end_time: String,
    pub duration_secs: f64,
    pub final_loss: Option<f64>,
    pub stop: StopReason,
}

/// Atomically write the run report (temp file + rename).
pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(report)?;
    buf.push('\n');
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &buf)
        .with_context(|| format!("write temp report {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace report {}", path.display()))?;
    Ok(())
}

/// Load a run report from disk.
pub fn load_report(path: &Path) -> Result<RunReport> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read report {}", path.display()))?;
    let report: RunReport = serde_json::from_str(&contents)
        .with_context(|| format!("parse report {}", path.display()))?;
    Ok(report)
}

/// Write `predictions.csv`: one row per record with its final prediction.
///
/// `scaled` must be the standardized feature matrix the model was trained
/// on, in dataset row order.
pub fn write_predictions(
    path: &Path,
    dataset: &Dataset,
    scaled: &Array2<f64>,
    model: &LinearModel,
) -> Result<()> {
    let mut buf = String::from("id,target,prediction,residual\n");
    for (i, id) in dataset.ids.iter().enumerate() {
        let prediction = model.predict(scaled.row(i));
        let target = dataset.targets[i];
        // Infallible for String.
        let _ = writeln!(buf, "{id},{target},{prediction},{}", target - prediction);
    }
    fs::write(path, buf).with_context(|| format!("write predictions {}", path.display()))?;
    Ok(())
}
