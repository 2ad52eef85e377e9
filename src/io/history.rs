//! Append-only round history (`history.jsonl`).
//!
//! Product artifact: always written, one JSON object per round, unaffected
//! by `RUST_LOG`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::types::RoundStats;

/// Append one round's statistics as a single JSON line.
pub fn append_round(path: &Path, stats: &RoundStats) -> Result<()> {
    let mut line = serde_json::to_string(stats).context("serialize round stats")?;
    line.push('\n');
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open history {}", path.display()))?;
    file.write_all(line.as_bytes())
        .with_context(|| format!("append history {}", path.display()))?;
    Ok(())
}

/// Read the full history. A missing file yields an empty history.
pub fn read_history(path: &Path) -> Result<Vec<RoundStats>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("read history {}", path.display()))?;
    let mut rounds = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let stats: RoundStats = serde_json::from_str(line)
            .with_context(|| format!("parse history line {} in {}", idx + 1, path.display()))?;
        rounds.push(stats);
    }
    Ok(rounds)
}

/// Rewrite the history keeping only rounds up to `last_round`.
///
/// Used when resuming from a checkpoint older than the last recorded round,
/// so the history and the model state agree again.
pub fn truncate_history(path: &Path, last_round: u32) -> Result<Vec<RoundStats>> {
    let kept: Vec<RoundStats> = read_history(path)?
        .into_iter()
        .filter(|stats| stats.round <= last_round)
        .collect();
    let mut buf = String::new();
    for stats in &kept {
        buf.push_str(&serde_json::to_string(stats).context("serialize round stats")?);
        buf.push('\n');
    }
    let tmp_path = path.with_extension("jsonl.tmp");
    fs::write(&tmp_path, &buf)
        .with_context(|| format!("write temp history {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace history {}", path.display()))?;
    Ok(kept)
}
