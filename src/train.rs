//! Multi-round training loop.

use std::fmt;

use anyhow::{Context, Result, anyhow};
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::core::convergence::PlateauDetector;
use crate::core::dataset::Dataset;
use crate::core::model::LinearModel;
use crate::core::scaling::FeatureScaling;
use crate::core::schedule::learning_rate_for_round;
use crate::core::sgd::run_round;
use crate::core::types::{RoundStats, StopReason};
use crate::io::config::PastaConfig;
use crate::io::history::append_round;
use crate::io::layout::OutputPaths;
use crate::io::model_store::{ModelArtifact, write_artifact};
use crate::io::run_state::{RunState, write_run_state};

/// Error raised when a round produces a non-finite loss.
///
/// Carried through `anyhow` so callers can downcast and map it to a
/// dedicated exit code.
#[derive(Debug, Clone, PartialEq)]
pub struct DivergedError {
    pub round: u32,
    pub loss: f64,
}

impl fmt::Display for DivergedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "round {} produced a non-finite loss ({}); lower learning_rate or raise lr_decay",
            self.round, self.loss
        )
    }
}

impl std::error::Error for DivergedError {}

/// Summary of a training invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOutcome {
    pub run_id: String,
    pub started_at_round: u32,
    pub rounds_executed: u32,
    pub final_loss: Option<f64>,
    pub stop: StopReason,
}

/// Mutable state threaded through the round loop.
pub struct TrainSession<'a> {
    pub paths: &'a OutputPaths,
    pub config: &'a PastaConfig,
    pub dataset: &'a Dataset,
    pub scaling: &'a FeatureScaling,
    /// Standardized feature matrix in dataset row order.
    pub scaled: Array2<f64>,
    pub model: LinearModel,
    pub run_state: RunState,
    pub rounds_requested: u32,
}

impl TrainSession<'_> {
    fn checkpoint(&self, rounds_completed: u32) -> ModelArtifact {
        ModelArtifact::new(
            self.dataset.feature_names.clone(),
            self.dataset.target_name.clone(),
            self.scaling.clone(),
            &self.model,
            rounds_completed,
        )
    }
}

/// Run rounds until the requested count is reached, the loss plateaus, or a
/// round diverges.
///
/// Each round appends a history line and persists run state before the next
/// round starts, so an interrupted run can resume from its last checkpoint.
pub fn run_rounds<F: FnMut(&RoundStats)>(
    session: &mut TrainSession<'_>,
    mut on_round: F,
) -> Result<TrainOutcome> {
    let run_id = session
        .run_state
        .run_id
        .clone()
        .ok_or_else(|| anyhow!("missing run id (bootstrap the run first)"))?;
    let started_at_round = session.run_state.next_round;
    let samples = session.dataset.len();

    let mut detector = PlateauDetector::new(session.config.tolerance, session.config.patience);
    // Seed the detector with the last persisted loss so a resumed run can
    // count its first round as flat.
    if let Some(prev) = session.run_state.last_loss {
        detector.observe(prev);
    }

    let mut rounds_executed = 0u32;
    let mut final_loss = session.run_state.last_loss;

    let stop = loop {
        let round = session.run_state.next_round;
        if round > session.rounds_requested {
            break StopReason::CompletedRounds;
        }

        let learning_rate = learning_rate_for_round(
            session.config.learning_rate,
            session.config.lr_decay,
            round,
        );
        let order = visit_order(samples, session.config, round);
        let mean_loss = run_round(
            &mut session.model,
            &session.scaled,
            &session.dataset.targets,
            &order,
            learning_rate,
        );

        // Loss is measured before each update, so also check the parameters:
        // the round's last update can overflow while the loss is still finite.
        if !mean_loss.is_finite() || !session.model.is_finite() {
            return Err(DivergedError {
                round,
                loss: mean_loss,
            }
            .into());
        }

        let stats = RoundStats {
            round,
            mean_loss,
            learning_rate,
            samples,
        };
        append_round(&session.paths.history_path, &stats)
            .with_context(|| format!("record round {round}"))?;

        session.run_state.next_round = round + 1;
        session.run_state.last_loss = Some(mean_loss);
        write_run_state(&session.paths.run_state_path, &session.run_state)?;
        if round % session.config.checkpoint_every == 0 {
            write_artifact(&session.paths.checkpoint_path, &session.checkpoint(round))?;
        }

        rounds_executed += 1;
        final_loss = Some(mean_loss);
        on_round(&stats);

        if detector.observe(mean_loss) {
            break StopReason::Converged {
                round,
                loss: mean_loss,
            };
        }
    };

    Ok(TrainOutcome {
        run_id,
        started_at_round,
        rounds_executed,
        final_loss,
        stop,
    })
}

/// Record visit order for one round.
///
/// The per-round RNG derives from the base seed and the round number so a
/// resumed run replays the identical stream.
fn visit_order(samples: usize, config: &PastaConfig, round: u32) -> Vec<usize> {
    let mut order: Vec<usize> = (0..samples).collect();
    if config.shuffle {
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(u64::from(round)));
        order.shuffle(&mut rng);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::history::read_history;
    use crate::io::run_state::load_run_state;

    const CSV: &str = "id,x1,x2,y\na,1,1,3\nb,2,1,5\nc,3,1,7\nd,4,1,9\ne,5,1,11\n";

    struct Fixture {
        _temp: tempfile::TempDir,
        paths: OutputPaths,
        dataset: Dataset,
        scaling: FeatureScaling,
    }

    fn fixture() -> Fixture {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = OutputPaths::new(temp.path().join("out"));
        paths.ensure_dirs().expect("dirs");
        let dataset = Dataset::from_csv(CSV).expect("parse");
        let scaling = FeatureScaling::fit(&dataset.features);
        Fixture {
            _temp: temp,
            paths,
            dataset,
            scaling,
        }
    }

    fn session<'a>(fixture: &'a Fixture, config: &'a PastaConfig, rounds: u32) -> TrainSession<'a> {
        let scaled = fixture.scaling.apply(&fixture.dataset.features);
        let model = LinearModel::zeros(fixture.dataset.feature_count());
        TrainSession {
            paths: &fixture.paths,
            config,
            dataset: &fixture.dataset,
            scaling: &fixture.scaling,
            scaled,
            model,
            run_state: RunState {
                run_id: Some("train-test".to_string()),
                next_round: 1,
                input_sha256: Some("0".repeat(64)),
                last_loss: None,
            },
            rounds_requested: rounds,
        }
    }

    #[test]
    fn missing_run_id_is_an_error() {
        let fixture = fixture();
        let config = PastaConfig::default();
        let mut session = session(&fixture, &config, 1);
        session.run_state.run_id = None;
        let err = run_rounds(&mut session, |_| {}).expect_err("missing run id");
        assert!(format!("{err:#}").contains("missing run id"));
    }

    #[test]
    fn completes_requested_rounds_and_persists_state() {
        let fixture = fixture();
        let config = PastaConfig {
            tolerance: 0.0,
            ..PastaConfig::default()
        };
        let mut session = session(&fixture, &config, 10);

        let mut seen = Vec::new();
        let outcome = run_rounds(&mut session, |stats| seen.push(stats.round)).expect("train");

        assert_eq!(outcome.stop, StopReason::CompletedRounds);
        assert_eq!(outcome.rounds_executed, 10);
        assert_eq!(seen, (1..=10).collect::<Vec<u32>>());

        let history = read_history(&fixture.paths.history_path).expect("history");
        assert_eq!(history.len(), 10);
        assert!(history.last().expect("rounds").mean_loss < history[0].mean_loss);

        let state = load_run_state(&fixture.paths.run_state_path).expect("state");
        assert_eq!(state.next_round, 11);
    }

    #[test]
    fn zero_rounds_executes_nothing() {
        let fixture = fixture();
        let config = PastaConfig::default();
        let mut session = session(&fixture, &config, 0);
        let outcome = run_rounds(&mut session, |_| {}).expect("train");
        assert_eq!(outcome.stop, StopReason::CompletedRounds);
        assert_eq!(outcome.rounds_executed, 0);
        assert_eq!(outcome.final_loss, None);
    }

    #[test]
    fn plateau_stops_early() {
        let fixture = fixture();
        let config = PastaConfig {
            tolerance: 100.0,
            patience: 2,
            ..PastaConfig::default()
        };
        let mut session = session(&fixture, &config, 1000);
        let outcome = run_rounds(&mut session, |_| {}).expect("train");
        match outcome.stop {
            StopReason::Converged { round, .. } => assert!(round < 10),
            StopReason::CompletedRounds => panic!("expected early convergence"),
        }
    }

    #[test]
    fn divergence_raises_typed_error() {
        let fixture = fixture();
        let config = PastaConfig {
            learning_rate: 200.0,
            tolerance: 0.0,
            ..PastaConfig::default()
        };
        let mut session = session(&fixture, &config, 500);
        let err = run_rounds(&mut session, |_| {}).expect_err("diverges");
        assert!(err.downcast_ref::<DivergedError>().is_some());
    }

    #[test]
    fn checkpoint_written_on_schedule() {
        let fixture = fixture();
        let config = PastaConfig {
            tolerance: 0.0,
            checkpoint_every: 3,
            ..PastaConfig::default()
        };
        let mut session = session(&fixture, &config, 4);
        run_rounds(&mut session, |_| {}).expect("train");

        let artifact =
            crate::io::model_store::load_artifact(&fixture.paths.checkpoint_path).expect("load");
        assert_eq!(artifact.rounds_completed, 3);
    }

    #[test]
    fn fixed_order_is_deterministic() {
        let fixture = fixture();
        let config = PastaConfig {
            shuffle: false,
            tolerance: 0.0,
            ..PastaConfig::default()
        };

        let mut first = session(&fixture, &config, 5);
        let mut second = session(&fixture, &config, 5);
        let a = run_rounds(&mut first, |_| {}).expect("train");
        let b = run_rounds(&mut second, |_| {}).expect("train");

        assert_eq!(a.final_loss, b.final_loss);
        assert_eq!(first.model, second.model);
    }
}
