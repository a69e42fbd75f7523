//! ETA estimation from a loaded model artifact.

use std::path::Path;

use tracing::debug;

use crate::artifact::ModelArtifact;
use crate::error::EtaError;
use crate::features::Trip;

/// Serves transit-time predictions from a model artifact loaded once at
/// process start-up.
///
/// The artifact is read-only after construction, so one estimator can be
/// shared across concurrent requests without locking. Construct it during
/// start-up and abort if the artifact is missing: predictions are never
/// attempted against a lazily-loaded model, and a failed load means the
/// estimator never serves at all.
#[derive(Debug, Clone)]
pub struct EtaEstimator {
    artifact: ModelArtifact,
}

impl EtaEstimator {
    /// Wraps an already-loaded artifact (e.g. fresh out of training).
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    /// Loads the artifact from disk. An error here should fail start-up.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, EtaError> {
        Ok(Self::new(ModelArtifact::load(path)?))
    }

    /// Predicted transit time in minutes: non-negative, rounded to two
    /// decimals.
    ///
    /// Categorical labels the model never saw fall into the encoder's
    /// unknown bucket and still produce a deterministic estimate. Encoding
    /// or inference failures surface as [`EtaError::Prediction`], never as a
    /// default guess.
    pub fn predict(&self, trip: &Trip) -> Result<f64, EtaError> {
        let row = self.artifact.encoder.transform(trip);
        let raw = self
            .artifact
            .forest
            .predict_row(&row)
            .ok_or_else(|| EtaError::Prediction("model has no fitted trees".to_string()))?;

        if !raw.is_finite() {
            return Err(EtaError::Prediction(format!(
                "model produced a non-finite estimate: {raw}"
            )));
        }

        // A regression model can emit a negative value; negative transit
        // time is physically meaningless, so floor at zero before rounding.
        let minutes = (raw.max(0.0) * 100.0).round() / 100.0;
        debug!(minutes, "predicted eta");
        Ok(minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimator_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EtaEstimator>();
    }
}

