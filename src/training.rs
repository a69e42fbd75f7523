//! Offline training pipeline for the ETA model.
//!
//! Runs as a batch job, never inside the live service: it reads historical
//! trips, fits the encoder and the bagged ensemble, evaluates on a held-out
//! partition, and bundles the result into a [`ModelArtifact`]. Replacing the
//! artifact a running estimator uses is an out-of-band deployment action.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::artifact::ModelArtifact;
use crate::error::{FitFailure, TrainError};
use crate::features::{OneHotEncoder, Trip};
use crate::forest::RandomForestRegressor;

/// One labeled historical trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainRecord {
    #[serde(flatten)]
    pub trip: Trip,
    pub actual_minutes: f64,
}

/// Training pipeline options.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Fraction of history held out for evaluation.
    pub eval_fraction: f64,
    /// Seed for the shuffle split and bootstrap sampling.
    pub seed: u64,
    /// Number of trees in the bagged ensemble.
    pub n_trees: usize,
    /// Depth cap per tree; `None` grows each tree until splits stop paying.
    pub max_depth: Option<usize>,
    /// Minimum held-out r-squared required to release the artifact.
    /// `None` skips the gate and always releases.
    pub min_r_squared: Option<f64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            eval_fraction: 0.2,
            seed: 42,
            n_trees: 100,
            max_depth: None,
            min_r_squared: None,
        }
    }
}

/// Held-out evaluation metrics for a training run.
#[derive(Debug, Clone, Copy)]
pub struct EvalReport {
    pub n_train: usize,
    pub n_eval: usize,
    pub r_squared: f64,
    pub mean_absolute_error: f64,
}

/// A trained artifact together with its evaluation report.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub artifact: ModelArtifact,
    pub report: EvalReport,
}

/// Fits an ETA model on historical trips.
///
/// The split is seeded and therefore reproducible. The categorical encoder
/// is fitted on the training partition only; evaluation trips may
/// legitimately carry labels that land in the unknown bucket, which mirrors
/// what inference will see.
pub fn train(history: &[TrainRecord], config: &TrainConfig) -> Result<TrainOutcome, TrainError> {
    if history.is_empty() {
        return Err(TrainError::EmptyHistory);
    }

    let mut indices: Vec<usize> = (0..history.len()).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    indices.shuffle(&mut rng);

    let n_eval = ((history.len() as f64) * config.eval_fraction).round() as usize;
    let n_train = history.len().saturating_sub(n_eval);
    if n_train == 0 || n_eval == 0 {
        return Err(TrainError::NotEnoughHistory { got: history.len() });
    }

    let (eval_idx, train_idx) = indices.split_at(n_eval);

    let train_trips: Vec<Trip> = train_idx.iter().map(|&i| history[i].trip.clone()).collect();
    let encoder = OneHotEncoder::fit(&train_trips);

    let train_rows: Vec<Vec<f64>> = train_trips.iter().map(|trip| encoder.transform(trip)).collect();
    let train_targets: Vec<f64> = train_idx.iter().map(|&i| history[i].actual_minutes).collect();

    let mut forest = RandomForestRegressor::new(config.n_trees).with_random_state(config.seed);
    if let Some(max_depth) = config.max_depth {
        forest = forest.with_max_depth(max_depth);
    }
    forest.fit(&train_rows, &train_targets)?;

    let eval_targets: Vec<f64> = eval_idx.iter().map(|&i| history[i].actual_minutes).collect();
    let eval_predictions: Vec<f64> = eval_idx
        .iter()
        .map(|&i| {
            forest
                .predict_row(&encoder.transform(&history[i].trip))
                .ok_or_else(|| FitFailure("forest lost its trees after fit".to_string()))
        })
        .collect::<Result<_, _>>()?;

    let report = EvalReport {
        n_train,
        n_eval,
        r_squared: r_squared(&eval_targets, &eval_predictions),
        mean_absolute_error: mean_absolute_error(&eval_targets, &eval_predictions),
    };
    info!(
        n_train = report.n_train,
        n_eval = report.n_eval,
        r_squared = report.r_squared,
        mae = report.mean_absolute_error,
        "trained eta model"
    );

    if let Some(required) = config.min_r_squared {
        if report.r_squared < required {
            return Err(TrainError::BelowAccuracyGate {
                r_squared: report.r_squared,
                required,
            });
        }
    }

    Ok(TrainOutcome {
        artifact: ModelArtifact::new(encoder, forest),
        report,
    })
}

/// Coefficient of determination. Zero when the targets are constant and the
/// predictions miss them.
fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len() as f64;
    let mean = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, y_hat)| (y - y_hat).powi(2))
        .sum();

    if ss_tot <= f64::EPSILON {
        return if ss_res <= f64::EPSILON { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    actual
        .iter()
        .zip(predicted)
        .map(|(y, y_hat)| (y - y_hat).abs())
        .sum::<f64>()
        / actual.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(distance_km: f64, traffic: &str, actual_minutes: f64) -> TrainRecord {
        TrainRecord {
            trip: Trip {
                distance_km,
                num_stops: 2,
                weather: "Sunny".to_string(),
                time_of_day: "Morning".to_string(),
                traffic_level: traffic.to_string(),
            },
            actual_minutes,
        }
    }

    fn synthetic_history(n: usize) -> Vec<TrainRecord> {
        (0..n)
            .map(|i| {
                let distance = 5.0 + i as f64;
                let traffic = if i % 2 == 0 { "Low" } else { "Heavy" };
                let penalty = if i % 2 == 0 { 0.0 } else { 15.0 };
                record(distance, traffic, distance * 1.5 + penalty)
            })
            .collect()
    }

    #[test]
    fn empty_history_is_rejected() {
        let err = train(&[], &TrainConfig::default()).unwrap_err();
        assert!(matches!(err, TrainError::EmptyHistory));
    }

    #[test]
    fn too_small_history_cannot_be_split() {
        let history = vec![record(10.0, "Low", 15.0)];
        let err = train(&history, &TrainConfig::default()).unwrap_err();
        assert!(matches!(err, TrainError::NotEnoughHistory { got: 1 }));
    }

    #[test]
    fn split_sizes_follow_eval_fraction() {
        let history = synthetic_history(50);
        let outcome = train(&history, &TrainConfig::default()).expect("train should succeed");
        assert_eq!(outcome.report.n_eval, 10);
        assert_eq!(outcome.report.n_train, 40);
    }

    #[test]
    fn same_seed_trains_identical_models() {
        let history = synthetic_history(40);
        let config = TrainConfig {
            n_trees: 10,
            ..TrainConfig::default()
        };
        let a = train(&history, &config).expect("train a");
        let b = train(&history, &config).expect("train b");

        let probe = record(12.0, "Heavy", 0.0).trip;
        let row_a = a.artifact.encoder.transform(&probe);
        let row_b = b.artifact.encoder.transform(&probe);
        assert_eq!(row_a, row_b);
        assert_eq!(
            a.artifact.forest.predict_row(&row_a),
            b.artifact.forest.predict_row(&row_b)
        );
    }

    #[test]
    fn accuracy_gate_blocks_a_bad_model() {
        // Pure noise targets: held-out r-squared will be far below 0.99.
        let history: Vec<TrainRecord> = (0..40)
            .map(|i| record(10.0, "Low", if i % 3 == 0 { 5.0 } else { 500.0 }))
            .collect();
        let config = TrainConfig {
            n_trees: 5,
            min_r_squared: Some(0.99),
            ..TrainConfig::default()
        };
        let err = train(&history, &config).unwrap_err();
        assert!(matches!(err, TrainError::BelowAccuracyGate { .. }));
    }

    #[test]
    fn ungated_training_always_releases() {
        let history: Vec<TrainRecord> = (0..40)
            .map(|i| record(10.0, "Low", if i % 3 == 0 { 5.0 } else { 500.0 }))
            .collect();
        let outcome =
            train(&history, &TrainConfig::default()).expect("ungated run must release");
        assert!(outcome.artifact.forest.is_fitted());
    }
}
