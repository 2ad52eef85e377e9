//! Orchestration for a full training run: bootstrap, resume, finalize.
//!
//! A "run" is a training session identified by a stable `run_id` and tied to
//! the input file's fingerprint. Starting a run snapshots the resolved config
//! into the output directory; resuming reuses the snapshot and continues from
//! the last checkpoint.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::core::model::LinearModel;
use crate::core::scaling::FeatureScaling;
use crate::io::config::{PastaConfig, load_config, write_config};
use crate::io::history::truncate_history;
use crate::io::input::{LoadedInput, read_dataset};
use crate::io::layout::OutputPaths;
use crate::io::model_store::{ModelArtifact, load_artifact, write_artifact};
use crate::io::report::{RunReport, write_predictions, write_report};
use crate::io::run_state::{RunState, load_run_state, write_run_state};
use crate::train::{TrainOutcome, TrainSession, run_rounds};

/// Error raised when the output directory belongs to a different input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMismatchError {
    pub expected: String,
    pub found: String,
}

impl fmt::Display for InputMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "input fingerprint {} does not match the run's recorded {}",
            self.found, self.expected
        )
    }
}

impl std::error::Error for InputMismatchError {}

/// A full training request as assembled from the command line.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub rounds: u32,
    pub config_path: PathBuf,
    pub seed: Option<u64>,
    pub fresh: bool,
}

/// What a finished run produced, for CLI reporting.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcome: TrainOutcome,
    pub rounds_completed: u32,
    pub model_path: PathBuf,
    pub report_path: PathBuf,
}

/// Execute a training run end to end.
pub fn run(request: &RunRequest) -> Result<RunSummary> {
    let started_at = Utc::now();
    let paths = OutputPaths::new(&request.output);
    let loaded = read_dataset(&request.input)?;

    paths.ensure_dirs()?;
    if request.fresh {
        info!(output = %paths.root.display(), "discarding existing run state");
        paths.reset()?;
    }

    let bootstrap = prepare(request, &paths, &loaded)?;
    let config = bootstrap.config;
    let scaling = bootstrap.scaling;

    let mut session = TrainSession {
        paths: &paths,
        config: &config,
        dataset: &loaded.dataset,
        scaling: &scaling,
        scaled: scaling.apply(&loaded.dataset.features),
        model: bootstrap.model,
        run_state: bootstrap.run_state,
        rounds_requested: request.rounds,
    };

    let outcome = run_rounds(&mut session, |stats| {
        debug!(
            round = stats.round,
            mean_loss = stats.mean_loss,
            learning_rate = stats.learning_rate,
            "round complete"
        );
    })?;

    let rounds_completed = session.run_state.next_round - 1;
    let artifact = ModelArtifact::new(
        loaded.dataset.feature_names.clone(),
        loaded.dataset.target_name.clone(),
        scaling.clone(),
        &session.model,
        rounds_completed,
    );
    write_artifact(&paths.model_path, &artifact)?;
    // Final checkpoint too, so a later invocation resumes exactly here.
    write_artifact(&paths.checkpoint_path, &artifact)?;
    write_predictions(
        &paths.predictions_path,
        &loaded.dataset,
        &session.scaled,
        &session.model,
    )?;

    let finished_at = Utc::now();
    let report = RunReport {
        run_id: outcome.run_id.clone(),
        input: request.input.display().to_string(),
        input_sha256: loaded.sha256.clone(),
        records: loaded.dataset.len(),
        features: loaded.dataset.feature_count(),
        rounds_requested: request.rounds,
        rounds_completed,
        start_time: started_at.to_rfc3339(),
        end_time: finished_at.to_rfc3339(),
        duration_secs: (finished_at - started_at).num_milliseconds() as f64 / 1000.0,
        final_loss: outcome.final_loss,
        stop: outcome.stop,
    };
    write_report(&paths.report_path, &report)?;

    info!(
        run_id = %outcome.run_id,
        rounds_executed = outcome.rounds_executed,
        final_loss = ?outcome.final_loss,
        "run finished"
    );

    Ok(RunSummary {
        outcome,
        rounds_completed,
        model_path: paths.model_path.clone(),
        report_path: paths.report_path.clone(),
    })
}

struct Bootstrap {
    config: PastaConfig,
    scaling: FeatureScaling,
    model: LinearModel,
    run_state: RunState,
}

/// Decide between starting fresh and resuming, and load accordingly.
fn prepare(request: &RunRequest, paths: &OutputPaths, loaded: &LoadedInput) -> Result<Bootstrap> {
    let existing = if paths.run_state_path.exists() {
        Some(load_run_state(&paths.run_state_path)?)
    } else {
        None
    };

    if let Some(run_state) = existing
        && run_state.run_id.is_some()
    {
        return resume(request, paths, loaded, run_state);
    }
    start_fresh(request, paths, loaded)
}

fn start_fresh(
    request: &RunRequest,
    paths: &OutputPaths,
    loaded: &LoadedInput,
) -> Result<Bootstrap> {
    let mut config = load_config(&request.config_path)
        .with_context(|| format!("load config {}", request.config_path.display()))?;
    if let Some(seed) = request.seed {
        config.seed = seed;
    }
    write_config(&paths.config_path, &config).context("snapshot config")?;

    let run_id = format!("train-{}", Utc::now().format("%Y%m%d_%H%M%S"));
    let run_state = RunState {
        run_id: Some(run_id.clone()),
        next_round: 1,
        input_sha256: Some(loaded.sha256.clone()),
        last_loss: None,
    };
    write_run_state(&paths.run_state_path, &run_state)?;

    info!(
        run_id = %run_id,
        records = loaded.dataset.len(),
        features = loaded.dataset.feature_count(),
        "starting run"
    );

    Ok(Bootstrap {
        scaling: FeatureScaling::fit(&loaded.dataset.features),
        model: LinearModel::zeros(loaded.dataset.feature_count()),
        config,
        run_state,
    })
}

fn resume(
    request: &RunRequest,
    paths: &OutputPaths,
    loaded: &LoadedInput,
    mut run_state: RunState,
) -> Result<Bootstrap> {
    match &run_state.input_sha256 {
        Some(expected) if *expected != loaded.sha256 => {
            return Err(InputMismatchError {
                expected: expected.clone(),
                found: loaded.sha256.clone(),
            })
            .context("input file changed since the run started (pass --fresh to start over)");
        }
        _ => {}
    }

    if request.seed.is_some() {
        warn!("--seed is ignored on resume; the run's config snapshot wins");
    }

    // Resumed runs read the snapshot taken at round 1, not the external
    // config, so hyperparameters cannot drift mid-run.
    let config = load_config(&paths.config_path)
        .with_context(|| format!("load config snapshot {}", paths.config_path.display()))?;

    let (scaling, model, rounds_completed) = if paths.checkpoint_path.exists() {
        let artifact = load_artifact(&paths.checkpoint_path)
            .with_context(|| "load checkpoint (corrupt; pass --fresh to start over)")?;
        (
            artifact.scaling.clone(),
            artifact.to_model(),
            artifact.rounds_completed,
        )
    } else {
        // Interrupted before the first checkpoint: replay from round 1.
        // The fingerprint matched, so refitting yields the same scaling.
        (
            FeatureScaling::fit(&loaded.dataset.features),
            LinearModel::zeros(loaded.dataset.feature_count()),
            0,
        )
    };

    // Rewind to the checkpoint if the run was interrupted after it: the
    // model state and the history must agree before more rounds run.
    if run_state.next_round > rounds_completed + 1 {
        let kept = truncate_history(&paths.history_path, rounds_completed)?;
        run_state.next_round = rounds_completed + 1;
        run_state.last_loss = kept.last().map(|stats| stats.mean_loss);
        write_run_state(&paths.run_state_path, &run_state)?;
    }

    info!(
        run_id = ?run_state.run_id,
        next_round = run_state.next_round,
        "resuming run"
    );

    Ok(Bootstrap {
        scaling,
        model,
        config,
        run_state,
    })
}
