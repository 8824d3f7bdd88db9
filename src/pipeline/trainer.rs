//! Model training: the fit unit and the hyperparameter search
//!
//! A [`CreditPipeline`] is preprocessor + classifier. Fitting one runs
//! preprocess -> SMOTE -> forest, so every cross-validation fold refits the
//! preprocessor and the oversampler on its own training rows.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::{ForestParams, TrainConfig};
use super::evaluate::binary_recall;
use super::forest::{argmax, RandomForest};
use super::preprocess::{build_preprocessor, FittedPreprocessor};
use super::schema::{class_counts, ApplicantRecord, Dataset, DEFAULT_CLASS};
use super::smote::Smote;
use super::split::stratified_kfold;
use crate::error::{RiskError, RiskResult};
use crate::utils::create_grid_bar;

/// Anything that scores applicant records
///
/// `predict_proba` returns `[P(no default), P(default)]`.
pub trait RiskModel {
    fn predict_proba(&self, record: &ApplicantRecord) -> RiskResult<[f64; 2]>;

    fn predict(&self, record: &ApplicantRecord) -> RiskResult<u8> {
        Ok(argmax(self.predict_proba(record)?))
    }

    fn predict_proba_batch(&self, records: &[ApplicantRecord]) -> RiskResult<Vec<[f64; 2]>> {
        records.iter().map(|r| self.predict_proba(r)).collect()
    }

    fn predict_batch(&self, records: &[ApplicantRecord]) -> RiskResult<Vec<u8>> {
        records.iter().map(|r| self.predict(r)).collect()
    }
}

/// Fitted preprocessing transform followed by the trained forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPipeline {
    pub preprocessor: FittedPreprocessor,
    pub classifier: RandomForest,
}

impl RiskModel for CreditPipeline {
    fn predict_proba(&self, record: &ApplicantRecord) -> RiskResult<[f64; 2]> {
        let row = self.preprocessor.transform_one(record);
        if row.len() != self.classifier.n_features() {
            return Err(RiskError::data(format!(
                "preprocessor produced {} features but the classifier expects {}",
                row.len(),
                self.classifier.n_features()
            )));
        }
        Ok(self.classifier.predict_proba_one(&row))
    }
}

/// Fit preprocessor, SMOTE and forest on one set of training rows
pub fn fit_pipeline(
    records: &[ApplicantRecord],
    labels: &[u8],
    params: &ForestParams,
    k_neighbors: usize,
    seed: u64,
) -> RiskResult<CreditPipeline> {
    let preprocessor = build_preprocessor().fit(records)?;
    let x = preprocessor.transform(records);
    let (x_res, y_res) = Smote::new(k_neighbors, seed).fit_resample(&x, labels)?;
    let classifier = RandomForest::fit(&x_res, &y_res, params, seed)?;
    Ok(CreditPipeline {
        preprocessor,
        classifier,
    })
}

/// Cross-validation outcome for one grid configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvResult {
    pub params: ForestParams,
    /// Default-class recall on each validation fold
    pub fold_recalls: Vec<f64>,
    pub mean_recall: f64,
    pub std_recall: f64,
    /// 1 for the best mean recall; equal scores share a rank
    pub rank: usize,
}

/// Result of [`train_model`]
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Winning configuration refit on the whole training set
    pub pipeline: CreditPipeline,
    pub best_params: ForestParams,
    /// Mean CV recall of the winning configuration
    pub best_score: f64,
    /// Every configuration, in enumeration order
    pub cv_results: Vec<CvResult>,
}

fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Index of the highest score; the earliest index wins ties
fn select_best(scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &score) in scores.iter().enumerate() {
        if best.map_or(true, |b| score > scores[b]) {
            best = Some(i);
        }
    }
    best
}

fn assign_ranks(results: &mut [CvResult]) {
    let scores: Vec<f64> = results.iter().map(|r| r.mean_recall).collect();
    for result in results.iter_mut() {
        result.rank = 1 + scores.iter().filter(|&&s| s > result.mean_recall).count();
    }
}

/// Exhaustive grid search with stratified k-fold CV, scored on default-class
/// recall, then a refit of the winner on all of `train`.
///
/// Candidates are evaluated in parallel. Every candidate uses the same seed,
/// so the outcome does not depend on the number of threads.
pub fn train_model(train: &Dataset, config: &TrainConfig) -> RiskResult<TrainingOutcome> {
    config.validate()?;

    if train.is_empty() {
        return Err(RiskError::insufficient("training set is empty"));
    }
    let counts = class_counts(&train.labels);
    if counts.contains(&0) {
        return Err(RiskError::insufficient(format!(
            "training set contains a single class (counts {:?})",
            counts
        )));
    }

    let folds = stratified_kfold(&train.labels, config.cv_folds)?;
    let candidates = config.grid.candidates();
    let total = candidates.len() as u64;

    info!(
        candidates = candidates.len(),
        folds = folds.len(),
        rows = train.len(),
        "starting grid search"
    );

    let pb = create_grid_bar(total);
    let progress_counter = Arc::new(AtomicU64::new(0));

    let results: RiskResult<Vec<CvResult>> = candidates
        .par_iter()
        .map(|params| {
            let mut fold_recalls = Vec::with_capacity(folds.len());
            for fold in &folds {
                let fold_train = train.subset(&fold.train);
                let fold_valid = train.subset(&fold.validation);

                let pipeline = fit_pipeline(
                    &fold_train.records,
                    &fold_train.labels,
                    params,
                    config.k_neighbors,
                    config.seed,
                )?;
                let predicted = pipeline.predict_batch(&fold_valid.records)?;
                fold_recalls.push(binary_recall(&fold_valid.labels, &predicted, DEFAULT_CLASS));
            }

            let (mean_recall, std_recall) = mean_and_std(&fold_recalls);
            debug!(%params, mean_recall, std_recall, "cross-validated configuration");

            let count = progress_counter.fetch_add(1, Ordering::Relaxed);
            pb.set_position(count + 1);

            Ok(CvResult {
                params: *params,
                fold_recalls,
                mean_recall,
                std_recall,
                rank: 0,
            })
        })
        .collect();

    let mut cv_results = match results {
        Ok(results) => results,
        Err(e) => {
            pb.abandon();
            return Err(e);
        }
    };
    pb.finish_and_clear();
    info!(configs = total, "grid search finished");

    assign_ranks(&mut cv_results);

    let scores: Vec<f64> = cv_results.iter().map(|r| r.mean_recall).collect();
    let best_index = select_best(&scores)
        .ok_or_else(|| RiskError::InvalidConfig("hyperparameter grid is empty".to_string()))?;
    let best_params = cv_results[best_index].params;
    let best_score = cv_results[best_index].mean_recall;

    info!(%best_params, best_score, "selected configuration");

    let pipeline = fit_pipeline(
        &train.records,
        &train.labels,
        &best_params,
        config.k_neighbors,
        config.seed,
    )?;

    Ok(TrainingOutcome {
        pipeline,
        best_params,
        best_score,
        cv_results,
    })
}
