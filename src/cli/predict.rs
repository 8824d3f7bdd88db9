//! `riskscore predict`: score one applicant with the serving model

use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use super::args::PredictArgs;
use super::prompts::collect_applicant;
use crate::error::RiskError;
use crate::pipeline::schema::CategoricalFeature;
use crate::pipeline::{init_serving_model, make_prediction, ApplicantRecord};
use crate::utils::print_prediction;

/// Read one applicant from a JSON object keyed by column name
pub fn read_record_file(path: &Path) -> Result<ApplicantRecord> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read record file: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Record file is not valid JSON: {}", path.display()))?;
    let fields = value.as_object().ok_or_else(|| {
        RiskError::data(format!(
            "record file '{}' must hold a JSON object",
            path.display()
        ))
    })?;
    Ok(ApplicantRecord::from_fields(fields)?)
}

pub fn run_predict(args: &PredictArgs) -> Result<()> {
    // load before prompting so a missing model fails fast
    let model = init_serving_model(&args.model)?;

    let record = match &args.record {
        Some(path) => read_record_file(path)?,
        None => collect_applicant(args)?,
    };

    for feature in CategoricalFeature::ALL {
        let value = record.categorical(feature);
        if !feature.vocabulary().contains(&value.as_str()) {
            warn!(
                column = feature.column(),
                value = value.as_str(),
                "value not seen in training; encoded as the reference level"
            );
        }
    }

    let result = make_prediction(model, &record)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_prediction(&result);
    }
    Ok(())
}
