//! Per-sample stochastic gradient descent over one round.

use ndarray::{Array1, Array2};

use crate::core::model::LinearModel;

/// Run one full pass over the dataset in the given visit order.
///
/// Updates `model` in place with the half-squared-error gradient
/// (`w -= lr * err * x`, `b -= lr * err`) and returns the mean squared
/// error observed before each update. `order` must be a non-empty
/// permutation of `0..targets.len()`.
pub fn run_round(
    model: &mut LinearModel,
    features: &Array2<f64>,
    targets: &Array1<f64>,
    order: &[usize],
    learning_rate: f64,
) -> f64 {
    let mut loss_sum = 0.0;
    for &i in order {
        let x = features.row(i);
        let err = model.predict(x) - targets[i];
        loss_sum += err * err;
        model.weights.scaled_add(-learning_rate * err, &x);
        model.bias -= learning_rate * err;
    }
    loss_sum / order.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // target = 2 * x + 1 over x in 1..=5, pre-scaled to mean 0.
    fn linear_fixture() -> (Array2<f64>, Array1<f64>) {
        let features = array![[-2.0], [-1.0], [0.0], [1.0], [2.0]];
        let targets = array![3.0, 5.0, 7.0, 9.0, 11.0];
        (features, targets)
    }

    #[test]
    fn single_step_moves_prediction_toward_target() {
        let (features, targets) = linear_fixture();
        let mut model = LinearModel::zeros(1);
        let before = (model.predict(features.row(0)) - targets[0]).abs();
        run_round(&mut model, &features, &targets, &[0], 0.1);
        let after = (model.predict(features.row(0)) - targets[0]).abs();
        assert!(after < before);
    }

    #[test]
    fn repeated_rounds_reduce_loss() {
        let (features, targets) = linear_fixture();
        let order: Vec<usize> = (0..targets.len()).collect();
        let mut model = LinearModel::zeros(1);

        let first = run_round(&mut model, &features, &targets, &order, 0.05);
        let mut last = first;
        for _ in 0..200 {
            last = run_round(&mut model, &features, &targets, &order, 0.05);
        }

        assert!(last < first);
        assert!(last < 1e-3, "loss did not converge: {last}");
    }

    #[test]
    fn visit_order_is_respected() {
        let (features, targets) = linear_fixture();
        let mut forward = LinearModel::zeros(1);
        let mut reversed = LinearModel::zeros(1);

        run_round(&mut forward, &features, &targets, &[0, 1, 2, 3, 4], 0.1);
        run_round(&mut reversed, &features, &targets, &[4, 3, 2, 1, 0], 0.1);

        // Per-sample updates are order sensitive.
        assert_ne!(forward.weights[0], reversed.weights[0]);
    }
}
