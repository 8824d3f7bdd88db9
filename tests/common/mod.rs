//! Shared test utilities and fixture generators

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use riskscore::pipeline::schema::{
    ApplicantRecord, HOUSING_VALUES, PURPOSE_VALUES, SEX_VALUES,
};
use riskscore::pipeline::{ClassWeight, MaxDepth, ParamGrid, TrainConfig};
use std::path::PathBuf;
use tempfile::TempDir;

/// Header of the raw German Credit file, including its row-index column
pub const HEADER: &str =
    "Unnamed: 0,Age,Sex,Job,Housing,Saving accounts,Checking account,Credit amount,Duration,Purpose,Risk";

const SAVINGS: [&str; 5] = ["NA", "little", "moderate", "quite rich", "rich"];
const CHECKING: [&str; 4] = ["NA", "little", "moderate", "rich"];

/// Generate a German-Credit-shaped CSV with `rows` applicants
///
/// Long, large loans with a thin checking account are more likely "bad", so
/// a model has signal to learn. Account columns use both "NA" and empty
/// cells for missing values.
pub fn german_credit_csv(rows: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = String::from(HEADER);
    out.push('\n');

    for i in 0..rows {
        let age: i64 = rng.gen_range(19..=75);
        let sex = SEX_VALUES[rng.gen_range(0..SEX_VALUES.len())];
        let job: i64 = rng.gen_range(0..=3);
        let housing = HOUSING_VALUES[rng.gen_range(0..HOUSING_VALUES.len())];
        let saving = SAVINGS[rng.gen_range(0..SAVINGS.len())];
        let checking = CHECKING[rng.gen_range(0..CHECKING.len())];
        let duration: i64 = rng.gen_range(4..=72);
        let amount: i64 = rng.gen_range(250..=18_000);
        let purpose = PURPOSE_VALUES[rng.gen_range(0..PURPOSE_VALUES.len())];

        let mut risk_score = duration as f64 / 72.0 + amount as f64 / 18_000.0;
        if checking == "little" {
            risk_score += 0.5;
        }
        if age < 25 {
            risk_score += 0.2;
        }
        let noise: f64 = rng.gen_range(-0.35..0.35);
        let risk = if risk_score + noise > 1.4 { "bad" } else { "good" };

        // every seventh missing saving balance is an empty cell instead of "NA"
        let saving = if saving == "NA" && i % 7 == 0 { "" } else { saving };

        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{}\n",
            i, age, sex, job, housing, saving, checking, amount, duration, purpose, risk
        ));
    }
    out
}

/// Write `contents` to a CSV file inside a fresh temp directory
pub fn write_temp_csv(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("german_credit_data.csv");
    std::fs::write(&csv_path, contents).unwrap();
    (temp_dir, csv_path)
}

/// Temp CSV holding a synthetic dataset
pub fn create_temp_dataset(rows: usize, seed: u64) -> (TempDir, PathBuf) {
    write_temp_csv(&german_credit_csv(rows, seed))
}

/// Applicant used across scoring tests
pub fn sample_applicant() -> ApplicantRecord {
    ApplicantRecord {
        age: 30,
        sex: "male".to_string(),
        job: 2,
        housing: "own".to_string(),
        saving_accounts: "little".to_string(),
        checking_account: "moderate".to_string(),
        credit_amount: 2000.0,
        duration: 12,
        purpose: "car".to_string(),
    }
}

/// Two-configuration grid with small forests, for fast end-to-end runs
pub fn small_grid() -> ParamGrid {
    ParamGrid {
        n_estimators: vec![8],
        max_depth: vec![MaxDepth::Limited(6)],
        min_samples_split: vec![2],
        class_weight: vec![ClassWeight::Balanced, ClassWeight::BalancedSubsample],
    }
}

pub fn small_train_config() -> TrainConfig {
    TrainConfig {
        cv_folds: 3,
        grid: small_grid(),
        ..TrainConfig::default()
    }
}

/// Small grid in the TOML form accepted by `train --grid`
pub const SMALL_GRID_TOML: &str = r#"
n_estimators = [8]
max_depth = [6]
min_samples_split = [2]
class_weight = ["balanced"]
"#;
