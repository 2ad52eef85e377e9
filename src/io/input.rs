//! Input record file loading and fingerprinting.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::core::dataset::Dataset;

/// A parsed dataset plus the SHA-256 fingerprint of the file it came from.
///
/// The fingerprint is recorded in the run state so a resumed run can refuse
/// an input file that changed underneath it.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub dataset: Dataset,
    pub sha256: String,
}

/// Read and parse the input CSV.
pub fn read_dataset(path: &Path) -> Result<LoadedInput> {
    debug!(path = %path.display(), "reading input");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read input {}", path.display()))?;
    let dataset =
        Dataset::from_csv(&contents).with_context(|| format!("parse {}", path.display()))?;
    let sha256 = hex::encode(Sha256::digest(contents.as_bytes()));
    debug!(
        records = dataset.len(),
        features = dataset.feature_count(),
        "input loaded"
    );
    Ok(LoadedInput { dataset, sha256 })
}
