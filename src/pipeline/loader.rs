//! Dataset loader for the German Credit CSV/Parquet file
//!
//! Reads the raw file, keeps the known schema columns (dropping any row-index
//! column), folds missing account balances into the "unknown" category and
//! maps the risk label to 0/1.

use polars::prelude::*;
use std::path::Path;
use tracing::debug;

use super::schema::{
    ApplicantRecord, Dataset, AGE, CHECKING_ACCOUNT, CREDIT_AMOUNT, DURATION, FEATURE_COLUMNS,
    HOUSING, JOB, PURPOSE, RISK, SAVING_ACCOUNTS, SEX, UNKNOWN_CATEGORY,
};
use super::target::{map_target, TargetMapping};
use crate::error::{RiskError, RiskResult};

/// Literal token the raw file uses for an absent account
const NA_TOKEN: &str = "NA";

/// Columns whose missing values become the "unknown" category
const ACCOUNT_COLUMNS: [&str; 2] = [SAVING_ACCOUNTS, CHECKING_ACCOUNT];

/// Load a dataset from a file (CSV or Parquet based on extension)
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> RiskResult<LazyFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if !path.exists() {
        return Err(RiskError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input file not found: {}", path.display()),
        )));
    }

    // 0 means scan the whole file
    let infer = (infer_schema_length > 0).then_some(infer_schema_length);

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(infer)
            .finish()?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())?,
        _ => {
            return Err(RiskError::data(format!(
                "Unsupported file format: '{}'. Supported formats: csv, parquet",
                extension
            )))
        }
    };

    Ok(lf)
}

/// Load and clean the dataset, returning typed records and binary labels
pub fn load_data(path: &Path, infer_schema_length: usize) -> RiskResult<Dataset> {
    let raw = load_dataset(path, infer_schema_length)?.collect()?;
    let cleaned = clean_frame(raw)?;
    frame_to_dataset(&cleaned)
}

/// Clean a raw frame
///
/// - keeps the nine feature columns plus `Risk`, in schema order, dropping
///   anything else (such as an unnamed row index)
/// - replaces nulls and the literal "NA" in both account columns with "unknown"
/// - replaces `Risk` with an Int32 column of 0/1 ("good"/"bad")
pub fn clean_frame(df: DataFrame) -> RiskResult<DataFrame> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut required: Vec<&str> = FEATURE_COLUMNS.to_vec();
    required.push(RISK);

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|c| !present.iter().any(|p| p == c))
        .collect();
    if !missing.is_empty() {
        return Err(RiskError::data(format!(
            "missing expected column(s): {}. Available columns: {:?}",
            missing.join(", "),
            present
        )));
    }

    let extras: Vec<&String> = present
        .iter()
        .filter(|p| !required.contains(&p.as_str()))
        .collect();
    if !extras.is_empty() {
        debug!(?extras, "dropping columns outside the schema");
    }

    let selected = df.select(required.iter().copied())?;

    let mut cleaned = selected
        .lazy()
        .with_columns(ACCOUNT_COLUMNS.map(unknown_for_missing))
        .collect()?;

    let labels = map_target(&cleaned, RISK, &TargetMapping::credit_risk())?;
    let labels: Vec<i32> = labels.into_iter().map(i32::from).collect();
    cleaned.with_column(Series::new(RISK.into(), labels))?;

    Ok(cleaned)
}

/// Expression replacing null / "NA" entries of an account column with "unknown"
fn unknown_for_missing(column: &str) -> Expr {
    let value = col(column).cast(DataType::String);
    when(value.clone().is_null().or(value.clone().eq(lit(NA_TOKEN))))
        .then(lit(UNKNOWN_CATEGORY))
        .otherwise(value)
        .alias(column)
}

/// Convert a cleaned frame into typed records.
///
/// Every record is validated against the categorical vocabularies; the first
/// offending row is reported with its 1-based row number.
pub fn frame_to_dataset(df: &DataFrame) -> RiskResult<Dataset> {
    let ages = integer_column(df, AGE)?;
    let sexes = string_column(df, SEX)?;
    let jobs = integer_column(df, JOB)?;
    let housing = string_column(df, HOUSING)?;
    let savings = string_column(df, SAVING_ACCOUNTS)?;
    let checking = string_column(df, CHECKING_ACCOUNT)?;
    let amounts = float_column(df, CREDIT_AMOUNT)?;
    let durations = integer_column(df, DURATION)?;
    let purposes = string_column(df, PURPOSE)?;
    let labels = integer_column(df, RISK)?;

    let mut records = Vec::with_capacity(df.height());
    let mut binary_labels = Vec::with_capacity(df.height());

    for row in 0..df.height() {
        let record = ApplicantRecord {
            age: ages[row],
            sex: sexes[row].clone(),
            job: jobs[row],
            housing: housing[row].clone(),
            saving_accounts: savings[row].clone(),
            checking_account: checking[row].clone(),
            credit_amount: amounts[row],
            duration: durations[row],
            purpose: purposes[row].clone(),
        };
        record.validate().map_err(|e| match e {
            RiskError::Data(msg) => RiskError::data(format!("row {}: {}", row + 1, msg)),
            other => other,
        })?;
        records.push(record);

        let label = u8::try_from(labels[row])
            .ok()
            .filter(|l| *l <= 1)
            .ok_or_else(|| {
                RiskError::data(format!("row {}: label {} is not binary", row + 1, labels[row]))
            })?;
        binary_labels.push(label);
    }

    Dataset::new(records, binary_labels)
}

fn string_column(df: &DataFrame, name: &str) -> RiskResult<Vec<String>> {
    let cast = df.column(name)?.cast(&DataType::String)?;
    cast.str()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.map(|s| s.to_string()).ok_or_else(|| {
                RiskError::data(format!("row {}: column '{}' is missing", row + 1, name))
            })
        })
        .collect()
}

fn float_column(df: &DataFrame, name: &str) -> RiskResult<Vec<f64>> {
    let cast = df.column(name)?.cast(&DataType::Float64)?;
    cast.f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.filter(|x| x.is_finite()).ok_or_else(|| {
                RiskError::data(format!(
                    "row {}: column '{}' is missing or not numeric",
                    row + 1,
                    name
                ))
            })
        })
        .collect()
}

fn integer_column(df: &DataFrame, name: &str) -> RiskResult<Vec<i64>> {
    float_column(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            if v.fract() == 0.0 {
                Ok(v as i64)
            } else {
                Err(RiskError::data(format!(
                    "row {}: column '{}' must be an integer, got {}",
                    row + 1,
                    name,
                    v
                )))
            }
        })
        .collect()
}
