//! Versioned persistence for the fitted encoder + regressor bundle.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EtaError, TrainError};
use crate::features::OneHotEncoder;
use crate::forest::RandomForestRegressor;

/// Current on-disk artifact format. Bumped on breaking layout changes; a
/// loader never guesses at an unknown version.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Persisted bundle of a fitted categorical encoder and a fitted regressor.
///
/// Created by the training pipeline, loaded once at estimator start-up, and
/// replaced only by deploying a new file. The encoder travels with the model
/// so training-time and inference-time encoding can never drift apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub encoder: OneHotEncoder,
    pub forest: RandomForestRegressor,
}

impl ModelArtifact {
    pub fn new(encoder: OneHotEncoder, forest: RandomForestRegressor) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            encoder,
            forest,
        }
    }

    /// Writes the artifact as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TrainError> {
        let path = path.as_ref();
        let bytes = serde_json::to_vec(self)
            .map_err(|err| TrainError::Artifact(format!("serialize: {err}")))?;
        fs::write(path, bytes)
            .map_err(|err| TrainError::Artifact(format!("write {}: {err}", path.display())))
    }

    /// Reads and validates an artifact. Any failure here means the estimator
    /// must not start serving.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EtaError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| {
            EtaError::ModelUnavailable(format!("cannot read {}: {err}", path.display()))
        })?;
        let artifact: Self = serde_json::from_slice(&bytes).map_err(|err| {
            EtaError::ModelUnavailable(format!("corrupt artifact {}: {err}", path.display()))
        })?;

        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(EtaError::ModelUnavailable(format!(
                "artifact format {} is unsupported, expected {}",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        if !artifact.forest.is_fitted() {
            return Err(EtaError::ModelUnavailable(
                "artifact contains an unfitted model".to_string(),
            ));
        }

        Ok(artifact)
    }
}
