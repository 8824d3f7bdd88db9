//! Synthetic minority oversampling (SMOTE)
//!
//! Balances a preprocessed training matrix by interpolating between minority
//! rows and their nearest minority neighbours. Runs inside the training fit
//! only; evaluation and scoring rows are never resampled.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::schema::class_counts;
use crate::error::{RiskError, RiskResult};

/// Default number of same-class neighbours considered per minority row
pub const DEFAULT_K_NEIGHBORS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Smote {
    pub k_neighbors: usize,
    pub seed: u64,
}

impl Smote {
    pub fn new(k_neighbors: usize, seed: u64) -> Self {
        Self { k_neighbors, seed }
    }

    /// Return `x`/`y` extended with synthetic minority rows until both classes
    /// have the same count. Already balanced input is returned unchanged.
    ///
    /// Original rows keep their positions; synthetic rows are appended.
    pub fn fit_resample(&self, x: &[Vec<f64>], y: &[u8]) -> RiskResult<(Vec<Vec<f64>>, Vec<u8>)> {
        if x.len() != y.len() {
            return Err(RiskError::data(format!(
                "{} feature rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        if self.k_neighbors == 0 {
            return Err(RiskError::InvalidConfig(
                "SMOTE needs at least one neighbour".to_string(),
            ));
        }

        let counts = class_counts(y);
        let minority_class: u8 = if counts[1] <= counts[0] { 1 } else { 0 };
        let n_minority = counts[usize::from(minority_class)];
        let n_majority = counts[usize::from(1 - minority_class)];
        let n_synthetic = n_majority - n_minority;

        let mut x_out = x.to_vec();
        let mut y_out = y.to_vec();
        if n_synthetic == 0 {
            return Ok((x_out, y_out));
        }

        // the row itself is excluded from its neighbour list
        if n_minority < self.k_neighbors + 1 {
            return Err(RiskError::insufficient(format!(
                "minority class {} has {} sample(s); SMOTE with k_neighbors={} needs at least {}",
                minority_class,
                n_minority,
                self.k_neighbors,
                self.k_neighbors + 1
            )));
        }

        let minority: Vec<&[f64]> = x
            .iter()
            .zip(y)
            .filter(|(_, &label)| label == minority_class)
            .map(|(row, _)| row.as_slice())
            .collect();

        let neighbours: Vec<Vec<usize>> = (0..minority.len())
            .map(|i| nearest_neighbours(&minority, i, self.k_neighbors))
            .collect();

        let mut rng = StdRng::seed_from_u64(self.seed);
        for _ in 0..n_synthetic {
            let i = rng.gen_range(0..minority.len());
            let nn = neighbours[i][rng.gen_range(0..self.k_neighbors)];
            let gap: f64 = rng.gen();

            let base = minority[i];
            let other = minority[nn];
            let synthetic: Vec<f64> = base
                .iter()
                .zip(other)
                .map(|(a, b)| a + gap * (b - a))
                .collect();

            x_out.push(synthetic);
            y_out.push(minority_class);
        }

        debug!(
            minority_class,
            original = n_minority,
            synthetic = n_synthetic,
            "SMOTE resampled training matrix"
        );

        Ok((x_out, y_out))
    }
}

impl Default for Smote {
    fn default() -> Self {
        Self::new(DEFAULT_K_NEIGHBORS, 42)
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Indices of the `k` rows closest to `rows[target]`, excluding itself.
/// Ties are broken by lower index.
fn nearest_neighbours(rows: &[&[f64]], target: usize, k: usize) -> Vec<usize> {
    let mut distances: Vec<(f64, usize)> = rows
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != target)
        .map(|(j, row)| (squared_distance(rows[target], row), j))
        .collect();
    distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    distances.into_iter().take(k).map(|(_, j)| j).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imbalanced() -> (Vec<Vec<f64>>, Vec<u8>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..20 {
            x.push(vec![i as f64, 0.0]);
            y.push(0);
        }
        for i in 0..8 {
            x.push(vec![100.0 + i as f64, 10.0]);
            y.push(1);
        }
        (x, y)
    }

    #[test]
    fn test_balances_class_counts() {
        let (x, y) = imbalanced();
        let (x_res, y_res) = Smote::new(5, 42).fit_resample(&x, &y).unwrap();

        assert_eq!(class_counts(&y_res), [20, 20]);
        assert_eq!(x_res.len(), 40);
        assert_eq!(&x_res[..28], &x[..]);
    }

    #[test]
    fn test_synthetic_rows_interpolate_minority_rows() {
        let (x, y) = imbalanced();
        let (x_res, _) = Smote::new(5, 42).fit_resample(&x, &y).unwrap();

        for row in &x_res[28..] {
            assert!(row[0] >= 100.0 && row[0] <= 107.0, "outside minority hull: {:?}", row);
            assert!((row[1] - 10.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let (x, y) = imbalanced();
        let a = Smote::new(5, 7).fit_resample(&x, &y).unwrap();
        let b = Smote::new(5, 7).fit_resample(&x, &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_balanced_input_unchanged() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let y = vec![0, 1, 0, 1];
        let (x_res, y_res) = Smote::default().fit_resample(&x, &y).unwrap();
        assert_eq!(x_res, x);
        assert_eq!(y_res, y);
    }

    #[test]
    fn test_too_few_minority_samples() {
        let mut x = vec![vec![0.0]; 10];
        let mut y = vec![0u8; 10];
        for i in 0..5 {
            x.push(vec![i as f64]);
            y.push(1);
        }
        let err = Smote::new(5, 42).fit_resample(&x, &y).unwrap_err();
        assert!(matches!(err, RiskError::InsufficientData(_)));
    }

    #[test]
    fn test_nearest_neighbours_excludes_self() {
        let rows: Vec<Vec<f64>> = vec![vec![0.0], vec![1.0], vec![5.0], vec![2.0]];
        let refs: Vec<&[f64]> = rows.iter().map(|r| r.as_slice()).collect();
        assert_eq!(nearest_neighbours(&refs, 0, 2), vec![1, 3]);
    }
}
