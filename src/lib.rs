//! Record-oriented training runner.
//!
//! `pasta` reads a CSV record file, trains a linear model with per-sample
//! stochastic gradient descent for a configured number of rounds, and writes
//! the trained model plus run artifacts to an output directory. The
//! architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (parsing, scaling, the SGD
//!   round, convergence). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (input loading, config, artifact
//!   persistence). Isolated to keep orchestration thin.
//!
//! Orchestration modules ([`run`], [`train`]) coordinate core logic with I/O
//! to implement the CLI.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod train;
