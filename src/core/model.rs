//! Linear model trained by the round loop.

use ndarray::{Array1, ArrayView1};

/// Linear predictor: `w · x + b`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub weights: Array1<f64>,
    pub bias: f64,
}

impl LinearModel {
    /// Zero-initialized model for `features` inputs.
    pub fn zeros(features: usize) -> Self {
        Self {
            weights: Array1::zeros(features),
            bias: 0.0,
        }
    }

    /// Predict the target for one (scaled) feature row.
    pub fn predict(&self, x: ArrayView1<'_, f64>) -> f64 {
        self.weights.dot(&x) + self.bias
    }

    /// True when every parameter is finite.
    pub fn is_finite(&self) -> bool {
        self.bias.is_finite() && self.weights.iter().all(|w| w.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn zeros_predicts_zero() {
        let model = LinearModel::zeros(3);
        let x = array![1.0, 2.0, 3.0];
        assert_eq!(model.predict(x.view()), 0.0);
    }

    #[test]
    fn predict_is_dot_plus_bias() {
        let model = LinearModel {
            weights: array![2.0, -1.0],
            bias: 0.5,
        };
        let x = array![3.0, 4.0];
        assert_eq!(model.predict(x.view()), 2.5);
    }

    #[test]
    fn non_finite_parameters_are_detected() {
        let mut model = LinearModel::zeros(2);
        assert!(model.is_finite());
        model.weights[0] = f64::NAN;
        assert!(!model.is_finite());
    }
}
