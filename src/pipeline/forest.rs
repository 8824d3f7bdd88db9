//! Random forest classifier built from weighted CART trees
//!
//! Trees split on weighted Gini impurity, consider `sqrt(n_features)`
//! randomly chosen features per node and train on bootstrap samples. Each
//! tree gets its own seed drawn from the forest seed before training starts,
//! so the fitted forest is identical whatever the rayon thread count.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::{ClassWeight, ForestParams};
use super::schema::{class_counts, DEFAULT_CLASS};
use crate::error::{RiskError, RiskResult};

/// Values closer than this are treated as equal when choosing thresholds
const VALUE_EPSILON: f64 = 1e-10;

/// Minimum impurity decrease for a split to be kept
const MIN_GAIN: f64 = 1e-12;

/// Calculate Gini impurity for weighted class totals
///
/// For binary classification: Gini = 2 * p * (1 - p) where p is the weighted
/// share of the default class.
fn gini_impurity(events: f64, non_events: f64) -> f64 {
    let total = events + non_events;
    if total <= 0.0 {
        return 0.0;
    }
    let p = events / total;
    2.0 * p * (1.0 - p)
}

/// `n / (2 * n_c)` per class; a class with no members gets weight 0
fn balanced_weights(counts: [f64; 2]) -> [f64; 2] {
    let total = counts[0] + counts[1];
    counts.map(|c| if c > 0.0 { total / (2.0 * c) } else { 0.0 })
}

/// A tree node stored in a flat arena; children are arena indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        /// Weighted class distribution [P(0), P(1)]
        proba: [f64; 2],
    },
    Split {
        feature: usize,
        /// Rows with `value <= threshold` go left
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct TreeParams {
    max_depth: Option<usize>,
    min_samples_split: usize,
    max_features: usize,
}

/// A single CART classification tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Fit on the rows of `x` with non-zero `sample_weight`
    fn fit(
        x: &[Vec<f64>],
        y: &[u8],
        sample_weight: &[f64],
        params: TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let rows: Vec<usize> = (0..x.len()).filter(|&i| sample_weight[i] > 0.0).collect();
        let mut builder = TreeBuilder {
            x,
            y,
            weight: sample_weight,
            params,
            rng,
            nodes: Vec::new(),
        };
        builder.build(rows, 0);
        Self {
            nodes: builder.nodes,
        }
    }

    pub fn predict_proba_one(&self, row: &[f64]) -> [f64; 2] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { proba } => return *proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest leaf (a lone root leaf has depth 0)
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match &nodes[index] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [u8],
    weight: &'a [f64],
    params: TreeParams,
    rng: &'a mut StdRng,
    nodes: Vec<Node>,
}

struct SplitChoice {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl TreeBuilder<'_> {
    fn class_totals(&self, rows: &[usize]) -> (f64, f64) {
        rows.iter().fold((0.0, 0.0), |(neg, pos), &i| {
            if self.y[i] == DEFAULT_CLASS {
                (neg, pos + self.weight[i])
            } else {
                (neg + self.weight[i], pos)
            }
        })
    }

    fn build(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let (non_events, events) = self.class_totals(&rows);
        let index = self.nodes.len();
        let total = non_events + events;
        let proba = if total > 0.0 {
            [non_events / total, events / total]
        } else {
            [1.0, 0.0]
        };
        self.nodes.push(Node::Leaf { proba });

        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        let pure = non_events == 0.0 || events == 0.0;
        if depth_reached || pure || rows.len() < self.params.min_samples_split {
            return index;
        }

        let Some(choice) = self.best_split(&rows, events, non_events) else {
            return index;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&i| self.x[i][choice.feature] <= choice.threshold);

        let left = self.build(left_rows, depth + 1);
        let right = self.build(right_rows, depth + 1);
        self.nodes[index] = Node::Split {
            feature: choice.feature,
            threshold: choice.threshold,
            left,
            right,
        };
        index
    }

    /// Best (feature, threshold) among a random feature subset.
    ///
    /// Features are scanned in sampled order and only a strictly larger gain
    /// replaces the current best.
    fn best_split(&mut self, rows: &[usize], events: f64, non_events: f64) -> Option<SplitChoice> {
        let n_features = self.x[rows[0]].len();
        let candidates = sample(
            &mut *self.rng,
            n_features,
            self.params.max_features.min(n_features),
        );

        let total_weight = events + non_events;
        let parent_gini = gini_impurity(events, non_events);
        let mut best: Option<SplitChoice> = None;

        for feature in candidates.iter() {
            // (value, target, weight) sorted by value
            let mut sorted: Vec<(f64, u8, f64)> = rows
                .iter()
                .map(|&i| (self.x[i][feature], self.y[i], self.weight[i]))
                .collect();
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_events = 0.0f64;
            let mut left_non_events = 0.0f64;

            for i in 0..sorted.len() - 1 {
                let (value, target, weight) = sorted[i];
                if target == DEFAULT_CLASS {
                    left_events += weight;
                } else {
                    left_non_events += weight;
                }

                // never split between equal values
                let next = sorted[i + 1].0;
                if (next - value).abs() < VALUE_EPSILON {
                    continue;
                }

                let right_events = events - left_events;
                let right_non_events = non_events - left_non_events;
                let left_weight = left_events + left_non_events;
                let right_weight = right_events + right_non_events;

                let weighted_child_gini = (left_weight / total_weight)
                    * gini_impurity(left_events, left_non_events)
                    + (right_weight / total_weight) * gini_impurity(right_events, right_non_events);
                let gain = parent_gini - weighted_child_gini;

                if gain > MIN_GAIN && best.as_ref().map_or(true, |b| gain > b.gain) {
                    let mut threshold = value + (next - value) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(SplitChoice {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}

/// Bagged ensemble of [`DecisionTree`]s
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit a forest on a preprocessed matrix
    ///
    /// Fails when `x` is empty, rows differ in width, or `y` holds a single class.
    pub fn fit(x: &[Vec<f64>], y: &[u8], params: &ForestParams, seed: u64) -> RiskResult<Self> {
        if x.is_empty() {
            return Err(RiskError::insufficient("cannot fit a forest on zero rows"));
        }
        if x.len() != y.len() {
            return Err(RiskError::data(format!(
                "{} feature rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        let n_features = x[0].len();
        if n_features == 0 || x.iter().any(|row| row.len() != n_features) {
            return Err(RiskError::data("feature rows must share a non-zero width"));
        }
        let counts = class_counts(y);
        if counts.contains(&0) {
            return Err(RiskError::insufficient(format!(
                "training labels contain a single class (counts {:?})",
                counts
            )));
        }
        if params.n_estimators == 0 {
            return Err(RiskError::InvalidConfig(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        let tree_params = TreeParams {
            max_depth: params.max_depth.limit(),
            min_samples_split: params.min_samples_split.max(2),
            max_features: ((n_features as f64).sqrt() as usize).max(1),
        };
        let full_weights = balanced_weights(counts.map(|c| c as f64));

        let mut seeder = StdRng::seed_from_u64(seed);
        let tree_seeds: Vec<u64> = (0..params.n_estimators).map(|_| seeder.gen()).collect();

        let n = x.len();
        let trees = tree_seeds
            .par_iter()
            .map(|&tree_seed| {
                let mut rng = StdRng::seed_from_u64(tree_seed);

                let mut draws = vec![0u32; n];
                for _ in 0..n {
                    draws[rng.gen_range(0..n)] += 1;
                }

                let class_weight = match params.class_weight {
                    ClassWeight::Balanced => full_weights,
                    ClassWeight::BalancedSubsample => {
                        let mut boot = [0.0f64; 2];
                        for (i, &d) in draws.iter().enumerate() {
                            boot[usize::from(y[i])] += f64::from(d);
                        }
                        balanced_weights(boot)
                    }
                };

                let sample_weight: Vec<f64> = draws
                    .iter()
                    .zip(y)
                    .map(|(&d, &label)| f64::from(d) * class_weight[usize::from(label)])
                    .collect();

                DecisionTree::fit(x, y, &sample_weight, tree_params, &mut rng)
            })
            .collect();

        Ok(Self {
            params: *params,
            n_features,
            trees,
        })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Mean of the per-tree leaf distributions
    pub fn predict_proba_one(&self, row: &[f64]) -> [f64; 2] {
        let mut sum = [0.0f64; 2];
        for tree in &self.trees {
            let p = tree.predict_proba_one(row);
            sum[0] += p[0];
            sum[1] += p[1];
        }
        let n = self.trees.len() as f64;
        [sum[0] / n, sum[1] / n]
    }

    pub fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<[f64; 2]> {
        x.iter().map(|row| self.predict_proba_one(row)).collect()
    }

    /// Class with the larger probability; an exact tie goes to class 0
    pub fn predict_one(&self, row: &[f64]) -> u8 {
        argmax(self.predict_proba_one(row))
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<u8> {
        x.iter().map(|row| self.predict_one(row)).collect()
    }
}

pub fn argmax(proba: [f64; 2]) -> u8 {
    if proba[1] > proba[0] {
        1
    } else {
        0
    }
}
