//! Stable exit codes for the pasta CLI.

/// Run finished (all rounds executed or the loss converged early).
pub const OK: i32 = 0;
/// Invalid input, config, or run state, or any other runner error.
pub const INVALID: i32 = 1;
/// Training produced a non-finite loss.
pub const DIVERGED: i32 = 3;
