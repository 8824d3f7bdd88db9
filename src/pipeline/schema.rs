//! Applicant record schema for the German Credit dataset
//!
//! Column names, categorical vocabularies and the typed record every other
//! pipeline stage consumes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RiskError, RiskResult};

pub const AGE: &str = "Age";
pub const SEX: &str = "Sex";
pub const JOB: &str = "Job";
pub const HOUSING: &str = "Housing";
pub const SAVING_ACCOUNTS: &str = "Saving accounts";
pub const CHECKING_ACCOUNT: &str = "Checking account";
pub const CREDIT_AMOUNT: &str = "Credit amount";
pub const DURATION: &str = "Duration";
pub const PURPOSE: &str = "Purpose";
pub const RISK: &str = "Risk";

/// Feature columns in file order (target excluded)
pub const FEATURE_COLUMNS: [&str; 9] = [
    AGE,
    SEX,
    JOB,
    HOUSING,
    SAVING_ACCOUNTS,
    CHECKING_ACCOUNT,
    CREDIT_AMOUNT,
    DURATION,
    PURPOSE,
];

/// Category substituted for missing or "NA" account balances
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Raw label for a defaulted loan (maps to 1)
pub const BAD_LABEL: &str = "bad";
/// Raw label for a repaid loan (maps to 0)
pub const GOOD_LABEL: &str = "good";

/// Binary code of the default class
pub const DEFAULT_CLASS: u8 = 1;

pub const SEX_VALUES: [&str; 2] = ["male", "female"];
pub const JOB_LEVELS: [&str; 4] = ["0", "1", "2", "3"];
pub const HOUSING_VALUES: [&str; 3] = ["own", "free", "rent"];
pub const SAVING_VALUES: [&str; 5] = ["unknown", "little", "moderate", "quite rich", "rich"];
pub const CHECKING_VALUES: [&str; 4] = ["unknown", "little", "moderate", "rich"];
pub const PURPOSE_VALUES: [&str; 8] = [
    "radio/TV",
    "education",
    "furniture/equipment",
    "car",
    "business",
    "domestic appliances",
    "repairs",
    "vacation/others",
];

/// Numeric feature group (standardized)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericFeature {
    Age,
    CreditAmount,
    Duration,
}

impl NumericFeature {
    pub const ALL: [NumericFeature; 3] = [
        NumericFeature::Age,
        NumericFeature::CreditAmount,
        NumericFeature::Duration,
    ];

    pub fn column(self) -> &'static str {
        match self {
            NumericFeature::Age => AGE,
            NumericFeature::CreditAmount => CREDIT_AMOUNT,
            NumericFeature::Duration => DURATION,
        }
    }
}

/// Categorical feature group (one-hot encoded)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoricalFeature {
    Sex,
    Job,
    Housing,
    SavingAccounts,
    CheckingAccount,
    Purpose,
}

impl CategoricalFeature {
    pub const ALL: [CategoricalFeature; 6] = [
        CategoricalFeature::Sex,
        CategoricalFeature::Job,
        CategoricalFeature::Housing,
        CategoricalFeature::SavingAccounts,
        CategoricalFeature::CheckingAccount,
        CategoricalFeature::Purpose,
    ];

    pub fn column(self) -> &'static str {
        match self {
            CategoricalFeature::Sex => SEX,
            CategoricalFeature::Job => JOB,
            CategoricalFeature::Housing => HOUSING,
            CategoricalFeature::SavingAccounts => SAVING_ACCOUNTS,
            CategoricalFeature::CheckingAccount => CHECKING_ACCOUNT,
            CategoricalFeature::Purpose => PURPOSE,
        }
    }

    /// Allowed values for this feature in training data
    pub fn vocabulary(self) -> &'static [&'static str] {
        match self {
            CategoricalFeature::Sex => &SEX_VALUES,
            CategoricalFeature::Job => &JOB_LEVELS,
            CategoricalFeature::Housing => &HOUSING_VALUES,
            CategoricalFeature::SavingAccounts => &SAVING_VALUES,
            CategoricalFeature::CheckingAccount => &CHECKING_VALUES,
            CategoricalFeature::Purpose => &PURPOSE_VALUES,
        }
    }
}

/// One loan applicant, shaped like a row of the input file without `Risk`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub age: i64,
    pub sex: String,
    /// Job skill level, 0 (unskilled non-resident) to 3 (highly skilled)
    pub job: i64,
    pub housing: String,
    pub saving_accounts: String,
    pub checking_account: String,
    pub credit_amount: f64,
    /// Loan duration in months
    pub duration: i64,
    pub purpose: String,
}

impl ApplicantRecord {
    pub fn numeric(&self, feature: NumericFeature) -> f64 {
        match feature {
            NumericFeature::Age => self.age as f64,
            NumericFeature::CreditAmount => self.credit_amount,
            NumericFeature::Duration => self.duration as f64,
        }
    }

    pub fn categorical(&self, feature: CategoricalFeature) -> String {
        match feature {
            CategoricalFeature::Sex => self.sex.clone(),
            CategoricalFeature::Job => self.job.to_string(),
            CategoricalFeature::Housing => self.housing.clone(),
            CategoricalFeature::SavingAccounts => self.saving_accounts.clone(),
            CategoricalFeature::CheckingAccount => self.checking_account.clone(),
            CategoricalFeature::Purpose => self.purpose.clone(),
        }
    }

    /// Check that every categorical value is in its vocabulary and that
    /// credit amount and duration are positive.
    ///
    /// Applied to training data only. Scoring tolerates unseen categories.
    pub fn validate(&self) -> RiskResult<()> {
        for feature in CategoricalFeature::ALL {
            let value = self.categorical(feature);
            if !feature.vocabulary().contains(&value.as_str()) {
                return Err(RiskError::data(format!(
                    "column '{}' has value '{}' outside its vocabulary {:?}",
                    feature.column(),
                    value,
                    feature.vocabulary()
                )));
            }
        }
        if !(self.credit_amount > 0.0) {
            return Err(RiskError::data(format!(
                "column '{}' must be positive, got {}",
                CREDIT_AMOUNT, self.credit_amount
            )));
        }
        if self.duration <= 0 {
            return Err(RiskError::data(format!(
                "column '{}' must be positive, got {}",
                DURATION, self.duration
            )));
        }
        Ok(())
    }

    /// Build a record from column-name keyed values (e.g. a JSON object
    /// submitted for scoring).
    ///
    /// Every required column is checked before any value is read, so a
    /// record missing several columns reports all of them at once.
    /// Numbers may be given as JSON numbers or numeric strings; extra keys
    /// are ignored.
    pub fn from_fields(fields: &Map<String, Value>) -> RiskResult<Self> {
        let missing: Vec<String> = FEATURE_COLUMNS
            .iter()
            .filter(|col| fields.get(**col).map_or(true, Value::is_null))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(RiskError::InferenceShape { missing });
        }

        Ok(Self {
            age: field_as_i64(fields, AGE)?,
            sex: field_as_string(fields, SEX)?,
            job: field_as_i64(fields, JOB)?,
            housing: field_as_string(fields, HOUSING)?,
            saving_accounts: field_as_string(fields, SAVING_ACCOUNTS)?,
            checking_account: field_as_string(fields, CHECKING_ACCOUNT)?,
            credit_amount: field_as_f64(fields, CREDIT_AMOUNT)?,
            duration: field_as_i64(fields, DURATION)?,
            purpose: field_as_string(fields, PURPOSE)?,
        })
    }
}

fn field_as_f64(fields: &Map<String, Value>, column: &str) -> RiskResult<f64> {
    let parsed = match &fields[column] {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| RiskError::data(format!("column '{}' must be numeric", column)))
}

fn field_as_i64(fields: &Map<String, Value>, column: &str) -> RiskResult<i64> {
    let value = field_as_f64(fields, column)?;
    if value.fract() != 0.0 {
        return Err(RiskError::data(format!(
            "column '{}' must be an integer, got {}",
            column, value
        )));
    }
    Ok(value as i64)
}

fn field_as_string(fields: &Map<String, Value>, column: &str) -> RiskResult<String> {
    match &fields[column] {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(RiskError::data(format!("column '{}' must be a string", column))),
    }
}

/// Applicant records paired with binary risk labels (1 = default)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<ApplicantRecord>,
    pub labels: Vec<u8>,
}

impl Dataset {
    pub fn new(records: Vec<ApplicantRecord>, labels: Vec<u8>) -> RiskResult<Self> {
        if records.len() != labels.len() {
            return Err(RiskError::data(format!(
                "{} records but {} labels",
                records.len(),
                labels.len()
            )));
        }
        if let Some(bad) = labels.iter().find(|&&l| l > 1) {
            return Err(RiskError::data(format!("label {} is not binary", bad)));
        }
        Ok(Self { records, labels })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count of (class 0, class 1) rows
    pub fn class_counts(&self) -> [usize; 2] {
        class_counts(&self.labels)
    }

    /// Rows at `indices`, in the order given
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }
}

pub fn class_counts(labels: &[u8]) -> [usize; 2] {
    let positives = labels.iter().filter(|&&l| l == DEFAULT_CLASS).count();
    [labels.len() - positives, positives]
}
