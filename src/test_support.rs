//! Test-only helpers for constructing inputs and run directories.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::io::config::{PastaConfig, write_config};
use crate::run::RunRequest;

/// Small linear dataset: `target = 2 * x1 + 1`, plus a constant column.
pub const LINEAR_CSV: &str = "id,x1,x2,target\n\
a,1.0,1.0,3.0\n\
b,2.0,1.0,5.0\n\
c,3.0,1.0,7.0\n\
d,4.0,1.0,9.0\n\
e,5.0,1.0,11.0\n";

/// Temporary workspace with an input CSV and an output directory.
pub struct TestRun {
    temp: TempDir,
}

impl TestRun {
    /// Workspace seeded with [`LINEAR_CSV`].
    pub fn new() -> Result<Self> {
        Self::with_csv(LINEAR_CSV)
    }

    pub fn with_csv(contents: &str) -> Result<Self> {
        let temp = TempDir::new().context("create tempdir")?;
        let run = Self { temp };
        fs::write(run.input_path(), contents).context("write input csv")?;
        Ok(run)
    }

    pub fn input_path(&self) -> PathBuf {
        self.temp.path().join("input.csv")
    }

    pub fn output_path(&self) -> PathBuf {
        self.temp.path().join("out")
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp.path().join("pasta.toml")
    }

    /// Write a config the next [`TestRun::request`] will pick up.
    pub fn write_config(&self, config: &PastaConfig) -> Result<()> {
        write_config(&self.config_path(), config)
    }

    /// Overwrite the input CSV (e.g. to test fingerprint mismatches).
    pub fn rewrite_input(&self, contents: &str) -> Result<()> {
        fs::write(self.input_path(), contents).context("rewrite input csv")
    }

    /// Request for a run over this workspace.
    pub fn request(&self, rounds: u32) -> RunRequest {
        RunRequest {
            input: self.input_path(),
            output: self.output_path(),
            rounds,
            config_path: self.config_path(),
            seed: None,
            fresh: false,
        }
    }
}
