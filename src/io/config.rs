//! Training configuration stored as TOML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Training configuration (TOML).
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to sensible values. A resolved copy
/// is snapshotted into the output directory when a run starts, and resumed
/// runs read the snapshot so hyperparameters cannot drift mid-run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PastaConfig {
    /// Base learning rate for round 1.
    pub learning_rate: f64,

    /// Inverse-decay factor applied per round.
    pub lr_decay: f64,

    /// Loss-improvement threshold for plateau detection.
    pub tolerance: f64,

    /// Consecutive flat rounds required before an early stop.
    pub patience: u32,

    /// Shuffle record visit order each round.
    pub shuffle: bool,

    /// Seed for the round shuffles.
    pub seed: u64,

    /// Checkpoint the model every this many rounds.
    pub checkpoint_every: u32,
}

impl Default for PastaConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            lr_decay: 0.01,
            tolerance: 1e-6,
            patience: 5,
            shuffle: true,
            seed: 17,
            checkpoint_every: 50,
        }
    }
}

impl PastaConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(anyhow!("learning_rate must be a finite value > 0"));
        }
        if !(self.lr_decay.is_finite() && self.lr_decay >= 0.0) {
            return Err(anyhow!("lr_decay must be a finite value >= 0"));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(anyhow!("tolerance must be a finite value >= 0"));
        }
        if self.patience == 0 {
            return Err(anyhow!("patience must be >= 1"));
        }
        if self.checkpoint_every == 0 {
            return Err(anyhow!("checkpoint_every must be >= 1"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `PastaConfig::default()`.
pub fn load_config(path: &Path) -> Result<PastaConfig> {
    if !path.exists() {
        let cfg = PastaConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: PastaConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &PastaConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, PastaConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("pasta.toml");
        let cfg = PastaConfig {
            learning_rate: 0.1,
            seed: 99,
            ..PastaConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("pasta.toml");
        fs::write(&path, "learning_rate = 0.2\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.learning_rate, 0.2);
        assert_eq!(cfg.patience, PastaConfig::default().patience);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let zero_lr = PastaConfig {
            learning_rate: 0.0,
            ..PastaConfig::default()
        };
        assert!(zero_lr.validate().is_err());

        let negative_decay = PastaConfig {
            lr_decay: -0.1,
            ..PastaConfig::default()
        };
        assert!(negative_decay.validate().is_err());

        let zero_patience = PastaConfig {
            patience: 0,
            ..PastaConfig::default()
        };
        assert!(zero_patience.validate().is_err());

        let zero_checkpoint = PastaConfig {
            checkpoint_every: 0,
            ..PastaConfig::default()
        };
        assert!(zero_checkpoint.validate().is_err());
    }
}
