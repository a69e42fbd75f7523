//! Bagged regression trees for ETA estimation.
//!
//! A small CART implementation: variance-reduction splits, mean-value
//! leaves, and a bootstrap-aggregated ensemble on top. Everything is
//! serde-serializable so a fitted forest can live inside the persisted
//! model artifact.

use std::cmp::Ordering;

use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::FitFailure;

/// A node in a fitted regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        value: f64,
    },
}

impl TreeNode {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TreeParams {
    max_depth: Option<usize>,
    min_samples_split: usize,
}

/// Random forest regressor: decision trees fitted on bootstrap samples,
/// predictions averaged across the ensemble.
///
/// Fitting is seeded and reproducible; trees are fitted in parallel since
/// training runs offline in a batch job, never on the request path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<TreeNode>,
    n_trees: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    random_state: u64,
}

impl RandomForestRegressor {
    pub fn new(n_trees: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_trees,
            max_depth: None,
            min_samples_split: 2,
            random_state: 0,
        }
    }

    /// Caps the depth of every tree in the ensemble.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Minimum samples required to split a node (floored at 2).
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Seeds bootstrap sampling for reproducible fits.
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Fits the ensemble on encoded feature rows and their targets.
    pub fn fit(&mut self, rows: &[Vec<f64>], targets: &[f64]) -> Result<(), FitFailure> {
        if rows.len() != targets.len() {
            return Err(FitFailure(format!(
                "{} feature rows but {} targets",
                rows.len(),
                targets.len()
            )));
        }
        if rows.is_empty() {
            return Err(FitFailure("cannot fit on zero samples".to_string()));
        }
        if self.n_trees == 0 {
            return Err(FitFailure("ensemble must have at least one tree".to_string()));
        }
        let width = rows[0].len();
        if width == 0 || rows.iter().any(|row| row.len() != width) {
            return Err(FitFailure("feature rows must be non-empty and rectangular".to_string()));
        }

        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
        };
        let base_seed = self.random_state;

        self.trees = (0..self.n_trees)
            .into_par_iter()
            .map(|tree_index| {
                let seed = base_seed.wrapping_add(tree_index as u64);
                let sample = bootstrap_sample(rows.len(), seed);
                build_tree(rows, targets, &sample, 0, params)
            })
            .collect();

        Ok(())
    }

    /// Averaged prediction for a single encoded row, or `None` before
    /// fitting.
    pub fn predict_row(&self, row: &[f64]) -> Option<f64> {
        if self.trees.is_empty() {
            return None;
        }
        let sum: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        Some(sum / self.trees.len() as f64)
    }
}

/// Draws `n` indices with replacement, seeded for reproducibility.
fn bootstrap_sample(n: usize, seed: u64) -> Vec<usize> {
    let dist = Uniform::from(0..n);
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| dist.sample(&mut rng)).collect()
}

fn mean_of(targets: &[f64], indices: &[usize]) -> f64 {
    indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
}

fn build_tree(
    rows: &[Vec<f64>],
    targets: &[f64],
    indices: &[usize],
    depth: usize,
    params: TreeParams,
) -> TreeNode {
    let mean = mean_of(targets, indices);

    let depth_capped = params.max_depth.is_some_and(|max| depth >= max);
    if indices.len() < params.min_samples_split || depth_capped {
        return TreeNode::Leaf { value: mean };
    }

    let Some((feature, threshold)) = best_split(rows, targets, indices) else {
        return TreeNode::Leaf { value: mean };
    };

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| rows[i][feature] <= threshold);
    if left.is_empty() || right.is_empty() {
        return TreeNode::Leaf { value: mean };
    }

    TreeNode::Split {
        feature,
        threshold,
        left: Box::new(build_tree(rows, targets, &left, depth + 1, params)),
        right: Box::new(build_tree(rows, targets, &right, depth + 1, params)),
    }
}

/// Finds the split minimizing the summed squared error of the two children.
/// Returns `None` when no split improves on the parent (e.g. constant
/// features or constant targets).
fn best_split(rows: &[Vec<f64>], targets: &[f64], indices: &[usize]) -> Option<(usize, f64)> {
    let n = indices.len() as f64;
    let total_sum: f64 = indices.iter().map(|&i| targets[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();
    let parent_sse = total_sq - total_sum * total_sum / n;

    let n_features = rows[indices[0]].len();
    let mut best: Option<(usize, f64)> = None;
    let mut best_sse = parent_sse - 1e-12;

    for feature in 0..n_features {
        let mut order = indices.to_vec();
        order.sort_by(|&a, &b| {
            rows[a][feature]
                .partial_cmp(&rows[b][feature])
                .unwrap_or(Ordering::Equal)
        });

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for (position, &i) in order.iter().enumerate().take(order.len() - 1) {
            let y = targets[i];
            left_sum += y;
            left_sq += y * y;

            let value = rows[i][feature];
            let next = rows[order[position + 1]][feature];
            if next <= value {
                // No threshold separates equal feature values.
                continue;
            }

            let left_n = (position + 1) as f64;
            let right_n = n - left_n;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            if sse < best_sse {
                best_sse = sse;
                best = Some((feature, (value + next) / 2.0));
            }
        }
    }

    best
}
