//! Feature preprocessing: standardization and one-hot encoding
//!
//! [`build_preprocessor`] returns an unfitted [`Preprocessor`]. Fitting
//! consumes it and yields a [`FittedPreprocessor`], so a transform can only
//! ever be fit once; test and inference rows go through the fitted value
//! unchanged.

use serde::{Deserialize, Serialize};

use super::schema::{ApplicantRecord, CategoricalFeature, NumericFeature};
use crate::error::{RiskError, RiskResult};

/// Standardized feature group
pub const NUMERIC_FEATURES: [NumericFeature; 3] = NumericFeature::ALL;

/// One-hot encoded feature group
pub const CATEGORICAL_FEATURES: [CategoricalFeature; 6] = CategoricalFeature::ALL;

/// Scales below this are treated as zero variance
const MIN_SCALE: f64 = 1e-12;

/// Unfitted column transform over the fixed feature groups
#[derive(Debug, Clone)]
pub struct Preprocessor {
    numeric: Vec<NumericFeature>,
    categorical: Vec<CategoricalFeature>,
}

/// Build the column transform: standardize numerics, one-hot categoricals
pub fn build_preprocessor() -> Preprocessor {
    Preprocessor {
        numeric: NUMERIC_FEATURES.to_vec(),
        categorical: CATEGORICAL_FEATURES.to_vec(),
    }
}

impl Preprocessor {
    /// Learn scaling statistics and category levels from `records`
    pub fn fit(self, records: &[ApplicantRecord]) -> RiskResult<FittedPreprocessor> {
        if records.is_empty() {
            return Err(RiskError::insufficient(
                "cannot fit the preprocessor on an empty training set",
            ));
        }

        let scalers = self
            .numeric
            .iter()
            .map(|&feature| StandardScaler::fit(feature, records))
            .collect();

        let encoders = self
            .categorical
            .iter()
            .map(|&feature| OneHotEncoder::fit(feature, records))
            .collect();

        Ok(FittedPreprocessor { scalers, encoders })
    }
}

/// Zero-mean, unit-variance scaling for one numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature: NumericFeature,
    pub mean: f64,
    /// Population standard deviation, or 1.0 for a constant column
    pub scale: f64,
}

impl StandardScaler {
    fn fit(feature: NumericFeature, records: &[ApplicantRecord]) -> Self {
        let n = records.len() as f64;
        let mean = records.iter().map(|r| r.numeric(feature)).sum::<f64>() / n;
        let variance = records
            .iter()
            .map(|r| (r.numeric(feature) - mean).powi(2))
            .sum::<f64>()
            / n;
        let std = variance.sqrt();
        let scale = if std < MIN_SCALE { 1.0 } else { std };
        Self {
            feature,
            mean,
            scale,
        }
    }

    fn transform(&self, record: &ApplicantRecord) -> f64 {
        (record.numeric(self.feature) - self.mean) / self.scale
    }
}

/// Drop-first one-hot encoding for one categorical column
///
/// `categories` holds every level seen during fit, sorted; the first is the
/// reference level and gets no indicator column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub feature: CategoricalFeature,
    pub categories: Vec<String>,
}

impl OneHotEncoder {
    fn fit(feature: CategoricalFeature, records: &[ApplicantRecord]) -> Self {
        let mut categories: Vec<String> = records.iter().map(|r| r.categorical(feature)).collect();
        categories.sort();
        categories.dedup();
        Self {
            feature,
            categories,
        }
    }

    /// Levels that get an indicator column
    pub fn encoded_levels(&self) -> &[String] {
        self.categories.get(1..).unwrap_or(&[])
    }

    /// Append this feature's indicators to `out`.
    ///
    /// The reference level and unseen levels both encode as all zeros.
    fn transform_into(&self, record: &ApplicantRecord, out: &mut Vec<f64>) {
        let value = record.categorical(self.feature);
        out.extend(
            self.encoded_levels()
                .iter()
                .map(|level| if *level == value { 1.0 } else { 0.0 }),
        );
    }
}

/// Column transform with statistics learned from training data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPreprocessor {
    pub scalers: Vec<StandardScaler>,
    pub encoders: Vec<OneHotEncoder>,
}

impl FittedPreprocessor {
    /// Width of a transformed row
    pub fn n_features(&self) -> usize {
        self.scalers.len()
            + self
                .encoders
                .iter()
                .map(|e| e.encoded_levels().len())
                .sum::<usize>()
    }

    /// Output column names: numeric columns, then `<column>_<level>` indicators
    pub fn feature_names(&self) -> Vec<String> {
        let numeric = self.scalers.iter().map(|s| s.feature.column().to_string());
        let categorical = self.encoders.iter().flat_map(|e| {
            e.encoded_levels()
                .iter()
                .map(move |level| format!("{}_{}", e.feature.column(), level))
        });
        numeric.chain(categorical).collect()
    }

    pub fn transform_one(&self, record: &ApplicantRecord) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.n_features());
        row.extend(self.scalers.iter().map(|s| s.transform(record)));
        for encoder in &self.encoders {
            encoder.transform_into(record, &mut row);
        }
        row
    }

    pub fn transform(&self, records: &[ApplicantRecord]) -> Vec<Vec<f64>> {
        records.iter().map(|r| self.transform_one(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(age: i64, sex: &str, housing: &str, amount: f64) -> ApplicantRecord {
        ApplicantRecord {
            age,
            sex: sex.to_string(),
            job: 2,
            housing: housing.to_string(),
            saving_accounts: "little".to_string(),
            checking_account: "unknown".to_string(),
            credit_amount: amount,
            duration: 12,
            purpose: "car".to_string(),
        }
    }

    fn training_records() -> Vec<ApplicantRecord> {
        vec![
            record(20, "male", "own", 1000.0),
            record(30, "female", "rent", 2000.0),
            record(40, "male", "free", 3000.0),
        ]
    }

    #[test]
    fn test_standardizes_numeric_columns() {
        let fitted = build_preprocessor().fit(&training_records()).unwrap();
        let rows = fitted.transform(&training_records());

        // Age column: mean 30, population std sqrt(200/3)
        let std = (200.0f64 / 3.0).sqrt();
        assert!((rows[0][0] - (-10.0 / std)).abs() < 1e-12);
        assert!(rows[1][0].abs() < 1e-12);

        let mean: f64 = rows.iter().map(|r| r[1]).sum::<f64>() / 3.0;
        assert!(mean.abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_is_centered_not_scaled() {
        let fitted = build_preprocessor().fit(&training_records()).unwrap();
        let duration = &fitted.scalers[2];
        assert_eq!(duration.mean, 12.0);
        assert_eq!(duration.scale, 1.0);
    }

    #[test]
    fn test_one_hot_drops_first_sorted_level() {
        let fitted = build_preprocessor().fit(&training_records()).unwrap();
        let names = fitted.feature_names();

        assert!(names.contains(&"Sex_male".to_string()));
        assert!(!names.contains(&"Sex_female".to_string()));
        assert!(names.contains(&"Housing_own".to_string()));
        assert!(names.contains(&"Housing_rent".to_string()));
        assert!(!names.contains(&"Housing_free".to_string()));
        assert_eq!(names.len(), fitted.n_features());
    }

    #[test]
    fn test_unseen_category_encodes_as_zeros() {
        let fitted = build_preprocessor().fit(&training_records()).unwrap();
        let names = fitted.feature_names();

        let row = fitted.transform_one(&record(35, "male", "houseboat", 1500.0));
        assert_eq!(row.len(), fitted.n_features());
        for (name, value) in names.iter().zip(&row) {
            if name.starts_with("Housing_") {
                assert_eq!(*value, 0.0, "{} should be zero", name);
            }
        }
    }

    #[test]
    fn test_fit_on_empty_fails() {
        assert!(build_preprocessor().fit(&[]).is_err());
    }

    #[test]
    fn test_transform_uses_training_statistics() {
        let fitted = build_preprocessor().fit(&training_records()).unwrap();
        let before = fitted.clone();
        let _ = fitted.transform(&[record(90, "female", "own", 99_000.0)]);
        assert_eq!(fitted, before);
        assert_eq!(fitted.scalers[0].mean, 30.0);
    }
}
