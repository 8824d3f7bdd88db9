//! Command-line argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::schema::{
    CHECKING_VALUES, HOUSING_VALUES, PURPOSE_VALUES, SAVING_VALUES, SEX_VALUES,
};

/// Default location of the labelled training data
pub const DEFAULT_DATA_PATH: &str = "data/german_credit_data.csv";

/// Default location of the model artifact
pub const DEFAULT_MODEL_PATH: &str = "models/credit_risk_model.bin";

/// Riskscore - Train and serve a credit default risk classifier
#[derive(Parser, Debug)]
#[command(name = "riskscore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase diagnostic logging on stderr (-v info, -vv debug).
    /// Without it the RISKSCORE_LOG environment variable is used.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the grid search, evaluate on the held-out split and save the model
    Train(TrainArgs),

    /// Score one applicant with a saved model
    Predict(PredictArgs),

    /// Score a saved model against a labelled data file
    Evaluate {
        /// Model artifact path
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Labelled input file (CSV or Parquet)
        #[arg(short, long, default_value = DEFAULT_DATA_PATH)]
        input: PathBuf,

        /// Number of rows to use for schema inference (CSV only).
        /// Use 0 for full table scan.
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },

    /// Print the metadata stored in a saved model
    Inspect {
        /// Model artifact path
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Labelled input file (CSV or Parquet)
    #[arg(short, long, default_value = DEFAULT_DATA_PATH)]
    pub input: PathBuf,

    /// Where to write the model artifact
    #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
    pub output: PathBuf,

    /// Fraction of rows held out for evaluation, exclusive (0, 1)
    #[arg(long, default_value = "0.2", value_parser = validate_test_size)]
    pub test_size: f64,

    /// Seed for the split, SMOTE and the forest
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Number of stratified cross-validation folds
    #[arg(long, default_value = "5", value_parser = validate_cv_folds)]
    pub cv_folds: usize,

    /// Neighbours considered when synthesizing minority rows
    #[arg(long, default_value = "5", value_parser = validate_k_neighbors)]
    pub k_neighbors: usize,

    /// TOML file overriding the hyperparameter grid
    #[arg(long)]
    pub grid: Option<PathBuf>,

    /// Write a JSON training report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// How many grid configurations to show in the leaderboard
    #[arg(long, default_value = "5")]
    pub leaderboard: usize,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

#[derive(Args, Debug, Default)]
pub struct PredictArgs {
    /// Model artifact path
    #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// JSON file holding one applicant keyed by column name.
    /// Field flags are ignored when this is given.
    #[arg(long)]
    pub record: Option<PathBuf>,

    /// Fail instead of prompting for fields not given as flags
    #[arg(long, default_value = "false")]
    pub no_prompt: bool,

    /// Print the result as JSON
    #[arg(long, default_value = "false")]
    pub json: bool,

    #[arg(long, value_parser = clap::value_parser!(i64).range(18..=80))]
    pub age: Option<i64>,

    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(SEX_VALUES))]
    pub sex: Option<String>,

    /// Job skill level, 0 (unskilled non-resident) to 3 (highly skilled)
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..=3))]
    pub job: Option<i64>,

    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(HOUSING_VALUES))]
    pub housing: Option<String>,

    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(SAVING_VALUES))]
    pub saving_accounts: Option<String>,

    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(CHECKING_VALUES))]
    pub checking_account: Option<String>,

    /// Credit amount in DM, 100 to 20000
    #[arg(long, value_parser = validate_credit_amount)]
    pub credit_amount: Option<f64>,

    /// Loan duration in months, 1 to 72
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=72))]
    pub duration: Option<i64>,

    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(PURPOSE_VALUES))]
    pub purpose: Option<String>,
}

/// Validator for test_size parameter
fn validate_test_size(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "test_size must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    }
}

/// Validator for cv_folds parameter
fn validate_cv_folds(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid fold count", s))?;

    if value < 2 {
        Err(format!("cv_folds must be at least 2, got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for k_neighbors parameter
fn validate_k_neighbors(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid neighbour count", s))?;

    if value == 0 {
        Err("k_neighbors must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

/// Validator for credit_amount parameter
pub fn validate_credit_amount(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if (100.0..=20_000.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "credit_amount must be between 100 and 20000, got {}",
            value
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_test_size() {
        assert_eq!(validate_test_size("0.2"), Ok(0.2));
        assert!(validate_test_size("0").is_err());
        assert!(validate_test_size("1").is_err());
        assert!(validate_test_size("abc").is_err());
    }

    #[test]
    fn test_validate_cv_folds() {
        assert_eq!(validate_cv_folds("5"), Ok(5));
        assert!(validate_cv_folds("1").is_err());
    }

    #[test]
    fn test_validate_credit_amount() {
        assert_eq!(validate_credit_amount("2500"), Ok(2500.0));
        assert!(validate_credit_amount("50").is_err());
        assert!(validate_credit_amount("25000").is_err());
    }
}
