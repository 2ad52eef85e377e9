//! Per-feature standardization fitted on a dataset.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Column-wise standardization parameters.
///
/// Fitted once per run and persisted with the model so predictions stay
/// reproducible on resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaling {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl FeatureScaling {
    /// Fit means and population deviations over the feature matrix.
    ///
    /// Zero deviations are clamped to 1 so constant columns pass through
    /// unscaled.
    pub fn fit(features: &Array2<f64>) -> Self {
        let n = features.nrows() as f64;
        let means: Vec<f64> = features
            .axis_iter(Axis(1))
            .map(|col| col.sum() / n)
            .collect();
        let stds: Vec<f64> = features
            .axis_iter(Axis(1))
            .zip(&means)
            .map(|(col, &mean)| {
                let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                if std == 0.0 { 1.0 } else { std }
            })
            .collect();
        Self { means, stds }
    }

    /// Standardize a feature matrix column by column.
    pub fn apply(&self, features: &Array2<f64>) -> Array2<f64> {
        let mut scaled = features.clone();
        for (j, mut col) in scaled.axis_iter_mut(Axis(1)).enumerate() {
            let mean = self.means[j];
            let std = self.stds[j];
            col.mapv_inplace(|v| (v - mean) / std);
        }
        scaled
    }
}
