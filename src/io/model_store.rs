//! Model artifact persistence (`model.json` and `state/checkpoint.json`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::core::model::LinearModel;
use crate::core::scaling::FeatureScaling;

/// Artifact schema version written into every model file.
pub const ARTIFACT_VERSION: u32 = 1;

/// Serialized model plus everything needed to reproduce its predictions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelArtifact {
    pub schema_version: u32,
    pub feature_names: Vec<String>,
    pub target_name: String,
    pub scaling: FeatureScaling,
    pub weights: Vec<f64>,
    pub bias: f64,
    /// Rounds completed when the artifact was written.
    pub rounds_completed: u32,
}

impl ModelArtifact {
    pub fn new(
        feature_names: Vec<String>,
        target_name: String,
        scaling: FeatureScaling,
        model: &LinearModel,
        rounds_completed: u32,
    ) -> Self {
        Self {
            schema_version: ARTIFACT_VERSION,
            feature_names,
            target_name,
            scaling,
            weights: model.weights.to_vec(),
            bias: model.bias,
            rounds_completed,
        }
    }

    /// Rebuild the in-memory model from the artifact.
    pub fn to_model(&self) -> LinearModel {
        LinearModel {
            weights: Array1::from_vec(self.weights.clone()),
            bias: self.bias,
        }
    }
}

/// Load a model artifact from disk.
pub fn load_artifact(path: &Path) -> Result<ModelArtifact> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read model {}", path.display()))?;
    let artifact: ModelArtifact =
        serde_json::from_str(&contents).with_context(|| format!("parse model {}", path.display()))?;
    Ok(artifact)
}

/// Atomically write a model artifact to disk (temp file + rename).
pub fn write_artifact(path: &Path, artifact: &ModelArtifact) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(artifact)?;
    buf.push('\n');
    let parent = path
        .parent()
        .with_context(|| format!("model path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &buf)
        .with_context(|| format!("write temp model {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace model {}", path.display()))?;
    Ok(())
}
