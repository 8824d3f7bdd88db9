//! Held-out evaluation: accuracy, ROC-AUC and a per-class report

use serde::{Deserialize, Serialize};

use super::schema::{class_counts, Dataset, BAD_LABEL, DEFAULT_CLASS, GOOD_LABEL};
use super::trainer::RiskModel;
use crate::error::{RiskError, RiskResult};

/// Precision/recall/F1 for one class (or an average over classes)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics with macro and support-weighted averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Indexed by class: 0 = good, 1 = bad (default)
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    /// Display name of a class index
    pub fn class_name(class: usize) -> &'static str {
        if class == usize::from(DEFAULT_CLASS) {
            BAD_LABEL
        } else {
            GOOD_LABEL
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub roc_auc: f64,
    pub report: ClassificationReport,
}

/// `num / den`, or 0 when the denominator is 0
fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Recall of `class`: true positives over actual members
///
/// Returns 0 when `class` does not occur in `actual`.
pub fn binary_recall(actual: &[u8], predicted: &[u8], class: u8) -> f64 {
    let support = actual.iter().filter(|&&a| a == class).count();
    let hits = actual
        .iter()
        .zip(predicted)
        .filter(|(&a, &p)| a == class && p == class)
        .count();
    ratio(hits as f64, support as f64)
}

/// Fraction of predictions equal to the actual label
pub fn accuracy(actual: &[u8], predicted: &[u8]) -> f64 {
    let correct = actual.iter().zip(predicted).filter(|(a, p)| a == p).count();
    ratio(correct as f64, actual.len() as f64)
}

/// Build the per-class report from actual and predicted labels
pub fn classification_report(actual: &[u8], predicted: &[u8]) -> ClassificationReport {
    let class_metrics = |class: u8| {
        let tp = actual
            .iter()
            .zip(predicted)
            .filter(|(&a, &p)| a == class && p == class)
            .count() as f64;
        let predicted_count = predicted.iter().filter(|&&p| p == class).count() as f64;
        let support = actual.iter().filter(|&&a| a == class).count();

        let precision = ratio(tp, predicted_count);
        let recall = ratio(tp, support as f64);
        let f1 = ratio(2.0 * precision * recall, precision + recall);
        ClassMetrics {
            precision,
            recall,
            f1,
            support,
        }
    };
    let classes = [class_metrics(0), class_metrics(1)];

    let total = actual.len();
    let macro_avg = ClassMetrics {
        precision: (classes[0].precision + classes[1].precision) / 2.0,
        recall: (classes[0].recall + classes[1].recall) / 2.0,
        f1: (classes[0].f1 + classes[1].f1) / 2.0,
        support: total,
    };
    let weighted = |f: fn(&ClassMetrics) -> f64| {
        ratio(
            classes.iter().map(|c| f(c) * c.support as f64).sum::<f64>(),
            total as f64,
        )
    };
    let weighted_avg = ClassMetrics {
        precision: weighted(|c| c.precision),
        recall: weighted(|c| c.recall),
        f1: weighted(|c| c.f1),
        support: total,
    };

    ClassificationReport {
        classes,
        accuracy: accuracy(actual, predicted),
        macro_avg,
        weighted_avg,
    }
}

/// Area under the ROC curve via the Mann-Whitney U statistic
///
/// Tied scores share their average rank, so a tie between a positive and a
/// negative counts as half a correct ordering. Fails when either class is
/// absent from `actual`.
pub fn roc_auc(actual: &[u8], scores: &[f64]) -> RiskResult<f64> {
    let counts = class_counts(actual);
    if counts.contains(&0) {
        return Err(RiskError::insufficient(format!(
            "ROC-AUC needs both classes in the evaluation labels (counts {:?})",
            counts
        )));
    }

    let mut pairs: Vec<(f64, u8)> = scores.iter().copied().zip(actual.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let total_neg = counts[0] as f64;
    let total_pos = counts[1] as f64;
    let n = pairs.len();
    let mut rank_sum_pos = 0.0;
    let mut i = 0;

    while i < n {
        let current = pairs[i].0;
        let mut j = i;
        while j < n && pairs[j].0 == current {
            j += 1;
        }

        // ranks i+1..=j share their mean
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let positives = pairs[i..j].iter().filter(|(_, t)| *t == DEFAULT_CLASS).count();
        rank_sum_pos += avg_rank * positives as f64;

        i = j;
    }

    let u = rank_sum_pos - total_pos * (total_pos + 1.0) / 2.0;
    Ok((u / (total_pos * total_neg)).clamp(0.0, 1.0))
}

/// Score a fitted model on a labelled dataset
///
/// Read-only with respect to the model.
pub fn evaluate_model<M: RiskModel + ?Sized>(
    model: &M,
    test: &Dataset,
) -> RiskResult<EvaluationMetrics> {
    if test.is_empty() {
        return Err(RiskError::insufficient("evaluation set is empty"));
    }

    let probabilities = model.predict_proba_batch(&test.records)?;
    let predicted = model.predict_batch(&test.records)?;
    let default_scores: Vec<f64> = probabilities
        .iter()
        .map(|p| p[usize::from(DEFAULT_CLASS)])
        .collect();

    let report = classification_report(&test.labels, &predicted);
    Ok(EvaluationMetrics {
        accuracy: report.accuracy,
        roc_auc: roc_auc(&test.labels, &default_scores)?,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_ranking_auc_is_one() {
        let y = [0, 0, 1, 1];
        let s = [0.1, 0.2, 0.8, 0.9];
        assert_eq!(roc_auc(&y, &s).unwrap(), 1.0);
    }

    #[test]
    fn test_inverted_ranking_auc_is_zero() {
        let y = [1, 1, 0, 0];
        let s = [0.1, 0.2, 0.8, 0.9];
        assert_eq!(roc_auc(&y, &s).unwrap(), 0.0);
    }

    #[test]
    fn test_all_tied_auc_is_half() {
        let y = [0, 1, 0, 1];
        let s = [0.5; 4];
        assert!((roc_auc(&y, &s).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_auc_known_value() {
        // pairs (pos, neg): (0.35 > 0.1), (0.35 < 0.4), (0.8 > 0.1), (0.8 > 0.4)
        let y = [0, 0, 1, 1];
        let s = [0.1, 0.4, 0.35, 0.8];
        assert!((roc_auc(&y, &s).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_auc_single_class_fails() {
        assert!(matches!(
            roc_auc(&[1, 1], &[0.2, 0.3]),
            Err(RiskError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_classification_report() {
        let actual = [0, 0, 0, 1, 1];
        let predicted = [0, 1, 0, 1, 0];
        let report = classification_report(&actual, &predicted);

        assert!((report.classes[0].precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((report.classes[0].recall - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(report.classes[1].precision, 0.5);
        assert_eq!(report.classes[1].recall, 0.5);
        assert_eq!(report.classes[1].support, 2);
        assert!((report.accuracy - 0.6).abs() < 1e-12);
        assert_eq!(report.macro_avg.support, 5);

        let expected_weighted_recall = (2.0 / 3.0 * 3.0 + 0.5 * 2.0) / 5.0;
        assert!((report.weighted_avg.recall - expected_weighted_recall).abs() < 1e-12);
    }

    #[test]
    fn test_zero_division_is_zero() {
        let report = classification_report(&[0, 0, 1], &[0, 0, 0]);
        assert_eq!(report.classes[1].precision, 0.0);
        assert_eq!(report.classes[1].f1, 0.0);
    }

    #[test]
    fn test_binary_recall() {
        assert_eq!(binary_recall(&[1, 1, 0, 1], &[1, 0, 0, 1], 1), 2.0 / 3.0);
        assert_eq!(binary_recall(&[0, 0], &[0, 1], 1), 0.0);
    }

    #[test]
    fn test_class_names() {
        assert_eq!(ClassificationReport::class_name(0), "good");
        assert_eq!(ClassificationReport::class_name(1), "bad");
    }
}
