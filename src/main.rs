//! Riskscore: Credit Default Risk CLI Tool
//!
//! Trains a SMOTE + random forest pipeline on the German Credit dataset and
//! scores single applicants with the saved model.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use console::style;

use riskscore::cli::{evaluate, inspect, predict, train, Cli, Commands};
use riskscore::utils::logging;
use riskscore::RiskError;

/// Exit status when the model artifact is missing at startup
const EXIT_MODEL_NOT_FOUND: u8 = 2;

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Train(args) => train::run_train(args),
        Commands::Predict(args) => predict::run_predict(args),
        Commands::Evaluate {
            model,
            input,
            infer_schema_length,
        } => evaluate::run_evaluate(model, input, *infer_schema_length),
        Commands::Inspect { model } => inspect::run_inspect(model),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{} {}", style("warning:").yellow().bold(), e);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(RiskError::ArtifactNotFound { path }) = err.downcast_ref::<RiskError>() {
                eprintln!(
                    "{} Model not found at '{}'. Run 'riskscore train' first.",
                    style("error:").red().bold(),
                    path.display()
                );
                return ExitCode::from(EXIT_MODEL_NOT_FOUND);
            }
            eprintln!("{} {:#}", style("error:").red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
