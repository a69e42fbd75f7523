//! openrouteservice HTTP adapter for geocoding and tour optimization.

use tracing::debug;

use crate::error::{GeocodeFailure, OptimizeFailure};
use crate::ors_data::{
    JobPayload, OptimizationRequest, OptimizationResponse, PeliasResponse, VehiclePayload,
};
use crate::traits::{Coordinate, Geocoder, Job, TourOptimizer, VehicleSpec};

#[derive(Debug, Clone)]
pub struct OrsConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for OrsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openrouteservice.org".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

/// Blocking openrouteservice client. Implements both capability traits the
/// sequencer needs: Pelias search for geocoding and the optimization
/// endpoint for tour ordering.
///
/// One round trip per call, no retries. A failed call surfaces as a terminal
/// failure for the request that triggered it.
#[derive(Debug, Clone)]
pub struct OrsClient {
    config: OrsConfig,
    client: reqwest::blocking::Client,
}

impl OrsClient {
    pub fn new(config: OrsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl Geocoder for OrsClient {
    fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeFailure> {
        let url = format!("{}/geocode/search", self.config.base_url);

        let response = self
            .client
            .get(url)
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("text", address),
            ])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<PeliasResponse>())
            .map_err(|err| GeocodeFailure(err.to_string()))?;

        // First feature wins, matching how the search endpoint ranks results.
        let feature = response
            .features
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeFailure(format!("no match for {address:?}")))?;

        let [lon, lat] = feature.geometry.coordinates;
        debug!(address, lon, lat, "geocoded address");
        Ok(Coordinate::new(lon, lat))
    }
}

impl TourOptimizer for OrsClient {
    fn optimize(
        &self,
        vehicle: &VehicleSpec,
        jobs: &[Job],
    ) -> Result<Vec<usize>, OptimizeFailure> {
        let body = OptimizationRequest {
            jobs: jobs
                .iter()
                .map(|job| JobPayload {
                    id: job.id,
                    location: [job.location.lon, job.location.lat],
                })
                .collect(),
            vehicles: vec![VehiclePayload {
                id: 1,
                start: [vehicle.start.lon, vehicle.start.lat],
                end: [vehicle.end.lon, vehicle.end.lat],
            }],
        };

        let url = format!("{}/optimization", self.config.base_url);

        let response = self
            .client
            .post(url)
            .header("Authorization", self.config.api_key.as_str())
            .json(&body)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OptimizationResponse>())
            .map_err(|err| OptimizeFailure(err.to_string()))?;

        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| OptimizeFailure("optimizer returned no route".to_string()))?;

        let tour: Vec<usize> = route
            .steps
            .iter()
            .filter(|step| step.step_type == "job")
            .filter_map(|step| step.job)
            .collect();

        debug!(jobs = jobs.len(), tour_len = tour.len(), "optimizer tour received");
        Ok(tour)
    }
}
