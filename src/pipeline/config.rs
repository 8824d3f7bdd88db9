//! Training configuration and the hyperparameter grid
//!
//! The grid is a fixed set of named fields, each a list of enumerated values.
//! It can be overridden from a TOML file, and is validated before training
//! starts.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::smote::DEFAULT_K_NEIGHBORS;
use crate::error::{RiskError, RiskResult};

/// Class weighting scheme for the forest's impurity computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    /// `n / (2 * n_c)` computed once from the labels the forest is fit on
    Balanced,
    /// Same formula, recomputed from each tree's bootstrap sample
    BalancedSubsample,
}

impl fmt::Display for ClassWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassWeight::Balanced => write!(f, "balanced"),
            ClassWeight::BalancedSubsample => write!(f, "balanced_subsample"),
        }
    }
}

impl FromStr for ClassWeight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "balanced" => Ok(ClassWeight::Balanced),
            "balanced_subsample" => Ok(ClassWeight::BalancedSubsample),
            _ => Err(format!(
                "Unknown class weight: '{}'. Use 'balanced' or 'balanced_subsample'.",
                s
            )),
        }
    }
}

/// Maximum tree depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMaxDepth", into = "RawMaxDepth")]
pub enum MaxDepth {
    Limited(usize),
    Unbounded,
}

impl MaxDepth {
    pub fn limit(self) -> Option<usize> {
        match self {
            MaxDepth::Limited(depth) => Some(depth),
            MaxDepth::Unbounded => None,
        }
    }
}

impl fmt::Display for MaxDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxDepth::Limited(depth) => write!(f, "{}", depth),
            MaxDepth::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// On-disk form of [`MaxDepth`]: an integer or the keyword "unbounded"
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawMaxDepth {
    Depth(usize),
    Keyword(String),
}

impl TryFrom<RawMaxDepth> for MaxDepth {
    type Error = String;

    fn try_from(raw: RawMaxDepth) -> Result<Self, Self::Error> {
        match raw {
            RawMaxDepth::Depth(depth) => Ok(MaxDepth::Limited(depth)),
            RawMaxDepth::Keyword(word) => match word.to_lowercase().as_str() {
                "unbounded" | "none" => Ok(MaxDepth::Unbounded),
                _ => Err(format!(
                    "Unknown max_depth '{}'. Use a positive integer or 'unbounded'.",
                    word
                )),
            },
        }
    }
}

impl From<MaxDepth> for RawMaxDepth {
    fn from(depth: MaxDepth) -> Self {
        match depth {
            MaxDepth::Limited(d) => RawMaxDepth::Depth(d),
            MaxDepth::Unbounded => RawMaxDepth::Keyword("unbounded".to_string()),
        }
    }
}

/// One point of the hyperparameter grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: MaxDepth,
    pub min_samples_split: usize,
    pub class_weight: ClassWeight,
}

impl fmt::Display for ForestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n_estimators={}, max_depth={}, min_samples_split={}, class_weight={}",
            self.n_estimators, self.max_depth, self.min_samples_split, self.class_weight
        )
    }
}

/// Exhaustive search space for the random forest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<MaxDepth>,
    pub min_samples_split: Vec<usize>,
    pub class_weight: Vec<ClassWeight>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            n_estimators: vec![100, 200],
            max_depth: vec![MaxDepth::Limited(10), MaxDepth::Limited(20), MaxDepth::Unbounded],
            min_samples_split: vec![2, 5],
            class_weight: vec![ClassWeight::Balanced, ClassWeight::BalancedSubsample],
        }
    }
}

impl ParamGrid {
    /// Parse a grid from TOML, e.g.
    ///
    /// ```toml
    /// n_estimators = [100, 200]
    /// max_depth = [10, 20, "unbounded"]
    /// min_samples_split = [2, 5]
    /// class_weight = ["balanced", "balanced_subsample"]
    /// ```
    pub fn from_toml_str(contents: &str) -> RiskResult<Self> {
        let grid: ParamGrid = toml::from_str(contents)
            .map_err(|e| RiskError::InvalidConfig(format!("grid file: {}", e)))?;
        grid.validate()?;
        Ok(grid)
    }

    pub fn load(path: &Path) -> RiskResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> RiskResult<()> {
        check_field("n_estimators", &self.n_estimators)?;
        check_field("max_depth", &self.max_depth)?;
        check_field("min_samples_split", &self.min_samples_split)?;
        check_field("class_weight", &self.class_weight)?;

        if self.n_estimators.contains(&0) {
            return Err(RiskError::InvalidConfig(
                "n_estimators values must be at least 1".to_string(),
            ));
        }
        if self.max_depth.contains(&MaxDepth::Limited(0)) {
            return Err(RiskError::InvalidConfig(
                "max_depth values must be at least 1".to_string(),
            ));
        }
        if let Some(bad) = self.min_samples_split.iter().find(|&&m| m < 2) {
            return Err(RiskError::InvalidConfig(format!(
                "min_samples_split values must be at least 2, got {}",
                bad
            )));
        }
        Ok(())
    }

    /// Number of configurations
    pub fn len(&self) -> usize {
        self.n_estimators.len()
            * self.max_depth.len()
            * self.min_samples_split.len()
            * self.class_weight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every configuration, ordered by class_weight, max_depth,
    /// min_samples_split, n_estimators (last varies fastest).
    ///
    /// This order is the search's tie-break order.
    pub fn candidates(&self) -> Vec<ForestParams> {
        let mut out = Vec::with_capacity(self.len());
        for &class_weight in &self.class_weight {
            for &max_depth in &self.max_depth {
                for &min_samples_split in &self.min_samples_split {
                    for &n_estimators in &self.n_estimators {
                        out.push(ForestParams {
                            n_estimators,
                            max_depth,
                            min_samples_split,
                            class_weight,
                        });
                    }
                }
            }
        }
        out
    }
}

fn check_field<T: PartialEq>(name: &str, values: &[T]) -> RiskResult<()> {
    if values.is_empty() {
        return Err(RiskError::InvalidConfig(format!(
            "grid field '{}' must list at least one value",
            name
        )));
    }
    for (i, value) in values.iter().enumerate() {
        if values[..i].contains(value) {
            return Err(RiskError::InvalidConfig(format!(
                "grid field '{}' lists a value twice",
                name
            )));
        }
    }
    Ok(())
}

/// Settings for one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Fraction of rows held out for evaluation
    pub test_size: f64,
    /// Seed for the split, SMOTE and the forest
    pub seed: u64,
    pub cv_folds: usize,
    pub k_neighbors: usize,
    pub grid: ParamGrid,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
            cv_folds: 5,
            k_neighbors: DEFAULT_K_NEIGHBORS,
            grid: ParamGrid::default(),
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> RiskResult<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(RiskError::InvalidConfig(format!(
                "test_size must be strictly between 0 and 1, got {}",
                self.test_size
            )));
        }
        if self.cv_folds < 2 {
            return Err(RiskError::InvalidConfig(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        if self.k_neighbors == 0 {
            return Err(RiskError::InvalidConfig(
                "k_neighbors must be at least 1".to_string(),
            ));
        }
        self.grid.validate()
    }
}
