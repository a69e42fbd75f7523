//! Error taxonomy for the planning and estimation pipelines.
//!
//! Every error here is terminal for the triggering request: nothing is
//! retried internally, and sequencing never returns a partial route.

use thiserror::Error;

/// Failure reported by a [`crate::traits::Geocoder`] backend.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct GeocodeFailure(pub String);

/// Failure reported by a [`crate::traits::TourOptimizer`] backend.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct OptimizeFailure(pub String);

/// Failure while fitting the regression model.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct FitFailure(pub String);

/// Errors from [`crate::sequencer::RouteSequencer::sequence`].
#[derive(Debug, Error)]
pub enum SequenceError {
    /// Fewer than two addresses were supplied.
    #[error("at least two addresses are required, got {got}")]
    InsufficientStops { got: usize },

    /// One address could not be resolved to coordinates. The whole request
    /// aborts: a tour missing a stop is not a safe substitute for the route
    /// the caller asked for.
    #[error("could not geocode address {address:?}: {source}")]
    Geocode {
        address: String,
        source: GeocodeFailure,
    },

    /// The tour optimizer failed or returned an unusable route.
    #[error("tour optimization failed: {0}")]
    Optimization(#[from] OptimizeFailure),
}

/// Errors from the ETA estimator.
#[derive(Debug, Error)]
pub enum EtaError {
    /// The model artifact was missing or unreadable. Raised at start-up;
    /// an estimator is never constructed without a loaded artifact.
    #[error("model artifact unavailable: {0}")]
    ModelUnavailable(String),

    /// Encoding or inference failed for a well-formed request. Never falls
    /// back to a default guess.
    #[error("prediction failed: {0}")]
    Prediction(String),
}

/// Errors from the offline training pipeline.
#[derive(Debug, Error)]
pub enum TrainError {
    /// No historical records were supplied.
    #[error("training history is empty")]
    EmptyHistory,

    /// Too few records to carve out both a training and an evaluation
    /// partition.
    #[error("not enough history to hold out an evaluation partition ({got} records)")]
    NotEnoughHistory { got: usize },

    /// Held-out accuracy fell short of the configured release gate.
    #[error("held-out r-squared {r_squared:.4} is below the required {required:.4}")]
    BelowAccuracyGate { r_squared: f64, required: f64 },

    /// The regressor could not be fitted.
    #[error("model fit failed: {0}")]
    Fit(#[from] FitFailure),

    /// The artifact could not be written.
    #[error("artifact write failed: {0}")]
    Artifact(String),
}
