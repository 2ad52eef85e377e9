//! Canonical paths within a run's output directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// All artifact paths for an output directory.
///
/// ```text
/// <out>/
///   model.json        final model artifact
///   report.json       run report
///   history.jsonl     one JSON object per round
///   predictions.csv   per-record predictions and residuals
///   state/
///     config.toml     resolved config snapshot
///     run_state.json  resume bookkeeping
///     checkpoint.json periodic model checkpoint
/// ```
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub root: PathBuf,
    pub state_dir: PathBuf,
    pub model_path: PathBuf,
    pub report_path: PathBuf,
    pub history_path: PathBuf,
    pub predictions_path: PathBuf,
    pub config_path: PathBuf,
    pub run_state_path: PathBuf,
    pub checkpoint_path: PathBuf,
}

impl OutputPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let state_dir = root.join("state");
        Self {
            model_path: root.join("model.json"),
            report_path: root.join("report.json"),
            history_path: root.join("history.jsonl"),
            predictions_path: root.join("predictions.csv"),
            config_path: state_dir.join("config.toml"),
            run_state_path: state_dir.join("run_state.json"),
            checkpoint_path: state_dir.join("checkpoint.json"),
            state_dir,
            root,
        }
    }

    /// Create the output and state directories.
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.state_dir)
            .with_context(|| format!("create state directory {}", self.state_dir.display()))?;
        Ok(())
    }

    /// Remove run-owned files so the directory starts over at round 1.
    pub fn reset(&self) -> Result<()> {
        for path in [
            &self.model_path,
            &self.report_path,
            &self.history_path,
            &self.predictions_path,
            &self.config_path,
            &self.run_state_path,
            &self.checkpoint_path,
        ] {
            remove_if_exists(path)?;
        }
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("remove {}", path.display()))?;
    }
    Ok(())
}
