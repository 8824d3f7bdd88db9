//! Single-record inference

use serde::{Deserialize, Serialize};

use super::schema::{ApplicantRecord, DEFAULT_CLASS};
use super::trainer::RiskModel;
use crate::error::RiskResult;

pub const LOW_RISK_LABEL: &str = "Low Risk (Good)";
pub const HIGH_RISK_LABEL: &str = "High Risk (Bad)";

/// Scored applicant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// 1 = predicted default
    pub prediction: u8,
    pub risk_label: String,
    /// Probability mass on the predicted class, percent, one decimal
    pub confidence: f64,
    /// Probability mass on the default class, percent, one decimal
    pub default_probability: f64,
}

/// Probability in [0, 1] as a percentage rounded to one decimal place
fn to_percent(p: f64) -> f64 {
    (p.clamp(0.0, 1.0) * 1000.0).round() / 10.0
}

pub fn risk_label(prediction: u8) -> &'static str {
    if prediction == DEFAULT_CLASS {
        HIGH_RISK_LABEL
    } else {
        LOW_RISK_LABEL
    }
}

/// Score one applicant with a fitted model
///
/// Unseen categorical values are tolerated by the model's preprocessor.
pub fn make_prediction<M: RiskModel + ?Sized>(
    model: &M,
    record: &ApplicantRecord,
) -> RiskResult<PredictionResult> {
    let prediction = model.predict(record)?;
    let proba = model.predict_proba(record)?;

    Ok(PredictionResult {
        prediction,
        risk_label: risk_label(prediction).to_string(),
        confidence: to_percent(proba[usize::from(prediction.min(1))]),
        default_probability: to_percent(proba[usize::from(DEFAULT_CLASS)]),
    })
}
