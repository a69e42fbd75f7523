//! Core domain types and capability seams for route sequencing.
//!
//! Geocoding and tour optimization are external collaborators. Each is
//! modeled as a single-method trait so the sequencer can run against either
//! the live openrouteservice backend or a deterministic stub in tests.

use serde::{Deserialize, Serialize};

use crate::error::{GeocodeFailure, OptimizeFailure};

/// A geographic coordinate. Stored as `(longitude, latitude)`, the order the
/// wire formats use. Produced only by geocoding and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A geocoded stop tagged with the index of the originating address.
///
/// Identity is positional: addresses may repeat, so the index is the only
/// stable way to map optimizer output back to caller-visible addresses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub address_index: usize,
    pub location: Coordinate,
}

/// Optimizer-facing record for one intermediate stop. `id` carries the
/// original address index through the solver untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Job {
    pub id: usize,
    pub location: Coordinate,
}

/// Single-vehicle start/end constraint handed to the optimizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleSpec {
    pub start: Coordinate,
    pub end: Coordinate,
}

/// Resolves a free-text address to a coordinate.
///
/// One blocking round trip per call. Retry and timeout policy belong to the
/// implementation, never to the callers.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeFailure>;
}

/// Orders a set of jobs into a tour for a single vehicle.
///
/// Returns job ids in visiting order, excluding the pinned start and end.
/// An infeasible or empty result is an error, not an empty tour.
pub trait TourOptimizer {
    fn optimize(
        &self,
        vehicle: &VehicleSpec,
        jobs: &[Job],
    ) -> Result<Vec<usize>, OptimizeFailure>;
}
