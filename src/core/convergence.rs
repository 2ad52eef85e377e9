//! Plateau detection for early stopping.

/// Tracks per-round losses and reports convergence once the absolute
/// improvement stays within `tolerance` for `patience` consecutive rounds.
#[derive(Debug, Clone)]
pub struct PlateauDetector {
    tolerance: f64,
    patience: u32,
    last_loss: Option<f64>,
    flat_rounds: u32,
}

impl PlateauDetector {
    pub fn new(tolerance: f64, patience: u32) -> Self {
        Self {
            tolerance,
            patience,
            last_loss: None,
            flat_rounds: 0,
        }
    }

    /// Record a round's loss. Returns true once the plateau is long enough.
    ///
    /// The first observation only establishes a baseline and never
    /// converges; any improvement beyond tolerance resets the streak.
    pub fn observe(&mut self, loss: f64) -> bool {
        let flat = match self.last_loss {
            Some(prev) => (prev - loss).abs() <= self.tolerance,
            None => false,
        };
        self.last_loss = Some(loss);
        if flat {
            self.flat_rounds += 1;
        } else {
            self.flat_rounds = 0;
        }
        self.flat_rounds >= self.patience
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_never_converges() {
        let mut detector = PlateauDetector::new(1.0, 1);
        assert!(!detector.observe(0.5));
    }

    #[test]
    fn fires_after_patience_flat_rounds() {
        let mut detector = PlateauDetector::new(0.01, 3);
        assert!(!detector.observe(1.0));
        assert!(!detector.observe(1.001));
        assert!(!detector.observe(1.002));
        assert!(detector.observe(1.003));
    }

    #[test]
    fn improvement_resets_the_streak() {
        let mut detector = PlateauDetector::new(0.01, 2);
        assert!(!detector.observe(1.0));
        assert!(!detector.observe(1.001));
        // Big drop: streak resets.
        assert!(!detector.observe(0.5));
        assert!(!detector.observe(0.5001));
        assert!(detector.observe(0.5002));
    }
}
