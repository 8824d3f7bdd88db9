//! Stratified train/test split and stratified k-fold partitioning
//!
//! Both preserve the class ratio of the labels. The train/test split shuffles
//! with a seeded RNG; k-fold is unshuffled so folds depend only on row order.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::schema::Dataset;
use crate::error::{RiskError, RiskResult};

/// Row indices of a train/test partition, each sorted ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// One cross-validation fold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

fn indices_by_class(labels: &[u8]) -> [Vec<usize>; 2] {
    let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for (i, &label) in labels.iter().enumerate() {
        by_class[usize::from(label.min(1))].push(i);
    }
    by_class
}

/// Compute a stratified train/test partition of `labels`
///
/// Each class contributes `round(n_c * test_size)` rows to the test set,
/// clamped so both sides keep at least one row of every class.
pub fn split_indices(labels: &[u8], test_size: f64, seed: u64) -> RiskResult<SplitIndices> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(RiskError::InvalidConfig(format!(
            "test_size must be strictly between 0 and 1, got {}",
            test_size
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for (class, mut members) in indices_by_class(labels).into_iter().enumerate() {
        if members.len() < 2 {
            return Err(RiskError::insufficient(format!(
                "class {} has {} member(s); stratified splitting needs at least 2",
                class,
                members.len()
            )));
        }
        members.shuffle(&mut rng);

        let n_test = ((members.len() as f64 * test_size).round() as usize)
            .clamp(1, members.len() - 1);
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(SplitIndices { train, test })
}

/// Split a dataset into (train, test) with stratification on the label
pub fn split_data(dataset: &Dataset, test_size: f64, seed: u64) -> RiskResult<(Dataset, Dataset)> {
    let indices = split_indices(&dataset.labels, test_size, seed)?;
    Ok((dataset.subset(&indices.train), dataset.subset(&indices.test)))
}

/// Unshuffled stratified k-fold
///
/// Each class's rows, in order, are cut into `k` contiguous chunks whose sizes
/// differ by at most one; fold `f` validates on chunk `f` of every class.
pub fn stratified_kfold(labels: &[u8], k: usize) -> RiskResult<Vec<Fold>> {
    if k < 2 {
        return Err(RiskError::InvalidConfig(format!(
            "cross-validation needs at least 2 folds, got {}",
            k
        )));
    }

    let by_class = indices_by_class(labels);
    for (class, members) in by_class.iter().enumerate() {
        if members.len() < k {
            return Err(RiskError::insufficient(format!(
                "class {} has {} member(s); {}-fold cross-validation needs at least {}",
                class,
                members.len(),
                k,
                k
            )));
        }
    }

    let mut fold_of = vec![0usize; labels.len()];
    for members in &by_class {
        let base = members.len() / k;
        let remainder = members.len() % k;
        let mut start = 0;
        for fold in 0..k {
            let size = base + usize::from(fold < remainder);
            for &row in &members[start..start + size] {
                fold_of[row] = fold;
            }
            start += size;
        }
    }

    Ok((0..k)
        .map(|fold| {
            let (validation, train): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|&row| fold_of[row] == fold);
            Fold { train, validation }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n_neg: usize, n_pos: usize) -> Vec<u8> {
        // interleave so classes are not contiguous
        let mut out = Vec::new();
        let (mut neg, mut pos) = (n_neg, n_pos);
        while neg > 0 || pos > 0 {
            if neg > 0 {
                out.push(0);
                neg -= 1;
            }
            if neg > 0 {
                out.push(0);
                neg -= 1;
            }
            if pos > 0 {
                out.push(1);
                pos -= 1;
            }
        }
        out
    }

    #[test]
    fn test_split_is_deterministic() {
        let y = labels(70, 30);
        let a = split_indices(&y, 0.2, 42).unwrap();
        let b = split_indices(&y, 0.2, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_partitions_all_rows() {
        let y = labels(70, 30);
        let split = split_indices(&y, 0.2, 7).unwrap();
        assert_eq!(split.train.len() + split.test.len(), y.len());

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..y.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_preserves_class_ratio() {
        let y = labels(700, 300);
        let split = split_indices(&y, 0.2, 42).unwrap();
        let test_pos = split.test.iter().filter(|&&i| y[i] == 1).count();
        assert_eq!(split.test.len(), 200);
        assert_eq!(test_pos, 60);
    }

    #[test]
    fn test_split_different_seed_changes_partition() {
        let y = labels(70, 30);
        let a = split_indices(&y, 0.2, 1).unwrap();
        let b = split_indices(&y, 0.2, 2).unwrap();
        assert_ne!(a.test, b.test);
    }

    #[test]
    fn test_split_rejects_singleton_class() {
        let y = labels(10, 1);
        assert!(matches!(
            split_indices(&y, 0.2, 42),
            Err(RiskError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_split_rejects_bad_ratio() {
        let y = labels(10, 10);
        assert!(split_indices(&y, 0.0, 42).is_err());
        assert!(split_indices(&y, 1.0, 42).is_err());
    }

    #[test]
    fn test_kfold_covers_each_row_once() {
        let y = labels(23, 12);
        let folds = stratified_kfold(&y, 5).unwrap();
        assert_eq!(folds.len(), 5);

        let mut seen = vec![0usize; y.len()];
        for fold in &folds {
            assert_eq!(fold.train.len() + fold.validation.len(), y.len());
            for &i in &fold.validation {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_kfold_fold_sizes_balanced_per_class() {
        let y = labels(23, 12);
        let folds = stratified_kfold(&y, 5).unwrap();
        for fold in &folds {
            let pos = fold.validation.iter().filter(|&&i| y[i] == 1).count();
            assert!(pos == 2 || pos == 3, "positives per fold: {}", pos);
        }
    }

    #[test]
    fn test_kfold_rejects_small_class() {
        let y = labels(20, 3);
        assert!(matches!(
            stratified_kfold(&y, 5),
            Err(RiskError::InsufficientData(_))
        ));
    }
}
