//! Record-oriented training runner CLI.
//!
//! Reads a CSV record file, trains a linear model for a configured number of
//! rounds, and writes the model plus run artifacts to an output directory:
//!
//! ```bash
//! pasta -i 5de-jaar.csv -o 5de-jaar -r 1000
//! ```

use std::path::PathBuf;

use clap::Parser;

use pasta::core::types::StopReason;
use pasta::run::{RunRequest, RunSummary, run};
use pasta::train::DivergedError;
use pasta::{exit_codes, logging};

#[derive(Parser)]
#[command(name = "pasta", version, about = "Record-oriented training runner")]
struct Cli {
    /// Input CSV record file (id, features..., target).
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for the model and run artifacts.
    #[arg(short, long)]
    output: PathBuf,

    /// Number of training rounds.
    #[arg(short = 'r', long, default_value_t = 1000)]
    rounds: u32,

    /// Config file (a missing file falls back to defaults).
    #[arg(short, long, default_value = "pasta.toml")]
    config: PathBuf,

    /// Override the configured shuffle seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Discard existing state in the output directory and start over.
    #[arg(long)]
    fresh: bool,
}

fn main() {
    logging::init();
    let cli = Cli::parse();

    let request = RunRequest {
        input: cli.input,
        output: cli.output,
        rounds: cli.rounds,
        config_path: cli.config,
        seed: cli.seed,
        fresh: cli.fresh,
    };

    match run(&request) {
        Ok(summary) => print_summary(&summary),
        Err(err) => {
            eprintln!("{:#}", err);
            let code = if err.downcast_ref::<DivergedError>().is_some() {
                exit_codes::DIVERGED
            } else {
                exit_codes::INVALID
            };
            std::process::exit(code);
        }
    }
}

fn print_summary(summary: &RunSummary) {
    match summary.outcome.stop {
        StopReason::CompletedRounds => match summary.outcome.final_loss {
            Some(loss) => println!(
                "completed {} rounds (final loss {loss:.6})",
                summary.rounds_completed
            ),
            None => println!("no rounds executed"),
        },
        StopReason::Converged { round, loss } => {
            println!("converged at round {round} (loss {loss:.6})");
        }
    }
    println!("model written to {}", summary.model_path.display());
}
