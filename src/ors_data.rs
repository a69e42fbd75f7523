//! Wire payloads for the openrouteservice geocoding and optimization APIs.

use serde::{Deserialize, Serialize};

/// Response body of the Pelias `/geocode/search` endpoint (GeoJSON subset).
#[derive(Debug, Deserialize)]
pub struct PeliasResponse {
    #[serde(default)]
    pub features: Vec<PeliasFeature>,
}

#[derive(Debug, Deserialize)]
pub struct PeliasFeature {
    pub geometry: PeliasGeometry,
}

#[derive(Debug, Deserialize)]
pub struct PeliasGeometry {
    /// `[lon, lat]`
    pub coordinates: [f64; 2],
}

/// Request body of the `/optimization` endpoint.
#[derive(Debug, Serialize)]
pub struct OptimizationRequest {
    pub jobs: Vec<JobPayload>,
    pub vehicles: Vec<VehiclePayload>,
}

#[derive(Debug, Serialize)]
pub struct JobPayload {
    pub id: usize,
    /// `[lon, lat]`
    pub location: [f64; 2],
}

#[derive(Debug, Serialize)]
pub struct VehiclePayload {
    pub id: usize,
    pub start: [f64; 2],
    pub end: [f64; 2],
}

/// Response body of the `/optimization` endpoint, reduced to the step
/// sequence the sequencer needs.
#[derive(Debug, Deserialize)]
pub struct OptimizationResponse {
    #[serde(default)]
    pub routes: Vec<RoutePayload>,
}

#[derive(Debug, Deserialize)]
pub struct RoutePayload {
    #[serde(default)]
    pub steps: Vec<StepPayload>,
}

/// One step of an optimized route. Steps of type `"job"` carry the job id;
/// `"start"` and `"end"` steps do not.
#[derive(Debug, Deserialize)]
pub struct StepPayload {
    #[serde(rename = "type")]
    pub step_type: String,
    pub job: Option<usize>,
}
