//! Shared deterministic types for the training core.
//!
//! These types define stable contracts between core components and the
//! persisted artifacts. They must remain deterministic across runs.

use serde::{Deserialize, Serialize};

/// Statistics produced by a single training round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundStats {
    /// Round number (1-indexed).
    pub round: u32,
    /// Mean squared error observed over the round, before each update.
    pub mean_loss: f64,
    /// Effective learning rate used for the round.
    pub learning_rate: f64,
    /// Number of records visited.
    pub samples: usize,
}

/// Reason why a training run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// All requested rounds executed (including a request for zero rounds).
    CompletedRounds,
    /// Loss improvement stayed within tolerance long enough to stop early.
    Converged { round: u32, loss: f64 },
}
