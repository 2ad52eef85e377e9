//! Pure, deterministic training logic.
//!
//! Modules here perform no I/O and must remain deterministic across runs:
//! the same dataset, config, and seed always produce the same model.

pub mod convergence;
pub mod dataset;
pub mod model;
pub mod scaling;
pub mod schedule;
pub mod sgd;
pub mod types;
