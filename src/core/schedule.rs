//! Learning-rate schedule for the round loop.

/// Inverse-decay learning rate for a 1-indexed round:
/// `base / (1 + decay * (round - 1))`.
pub fn learning_rate_for_round(base: f64, decay: f64, round: u32) -> f64 {
    base / (1.0 + decay * f64::from(round.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_round_uses_base_rate() {
        assert_eq!(learning_rate_for_round(0.05, 0.01, 1), 0.05);
    }

    #[test]
    fn rate_decays_monotonically() {
        let rates: Vec<f64> = (1..=10)
            .map(|round| learning_rate_for_round(0.05, 0.1, round))
            .collect();
        assert!(rates.windows(2).all(|pair| pair[1] < pair[0]));
    }

    #[test]
    fn zero_decay_keeps_rate_constant() {
        assert_eq!(learning_rate_for_round(0.05, 0.0, 500), 0.05);
    }
}
