//! Risk label mapping
//!
//! Converts the textual `Risk` column ("good"/"bad") into the binary code the
//! classifier trains on: 1 for default, 0 otherwise.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::schema::{BAD_LABEL, GOOD_LABEL};
use crate::error::{RiskError, RiskResult};

/// Mapping configuration for converting target column values to binary 0/1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMapping {
    /// Value that maps to 1 (event)
    pub event_value: String,
    /// Value that maps to 0 (non-event)
    pub non_event_value: String,
}

impl TargetMapping {
    pub fn new(event_value: String, non_event_value: String) -> Self {
        Self {
            event_value,
            non_event_value,
        }
    }

    /// "bad" → 1, "good" → 0
    pub fn credit_risk() -> Self {
        Self::new(BAD_LABEL.to_string(), GOOD_LABEL.to_string())
    }
}

impl Default for TargetMapping {
    fn default() -> Self {
        Self::credit_risk()
    }
}

/// Create a binary target mask based on the mapping
///
/// Returns one entry per row:
/// - Some(1) for event values
/// - Some(0) for non-event values
/// - None for nulls and values that match neither side
pub fn create_target_mask(
    df: &DataFrame,
    target: &str,
    mapping: &TargetMapping,
) -> RiskResult<Vec<Option<u8>>> {
    let target_col = df
        .column(target)
        .map_err(|_| RiskError::data(format!("Target column '{}' not found", target)))?;

    let string_values = column_to_string_vec(target_col)?;

    Ok(string_values
        .iter()
        .map(|v| match v {
            Some(s) if s == &mapping.event_value => Some(1),
            Some(s) if s == &mapping.non_event_value => Some(0),
            _ => None,
        })
        .collect())
}

/// Map every target value to 0/1, failing on the first unmappable row
pub fn map_target(df: &DataFrame, target: &str, mapping: &TargetMapping) -> RiskResult<Vec<u8>> {
    let mask = create_target_mask(df, target, mapping)?;
    let raw = column_to_string_vec(df.column(target)?)?;

    mask.iter()
        .enumerate()
        .map(|(row, mapped)| {
            mapped.ok_or_else(|| {
                RiskError::data(format!(
                    "row {}: target '{}' value {:?} is neither '{}' nor '{}'",
                    row + 1,
                    target,
                    raw[row].as_deref().unwrap_or("<missing>"),
                    mapping.event_value,
                    mapping.non_event_value
                ))
            })
        })
        .collect()
}

/// Convert a column to a Vec of Option<String> for comparison
fn column_to_string_vec(col: &Column) -> RiskResult<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let cast = col.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}
