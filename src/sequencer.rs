//! Route sequencing: geocode every address, pin start and end, let the
//! optimizer order the middle.

use tracing::debug;

use crate::error::{OptimizeFailure, SequenceError};
use crate::haversine;
use crate::traits::{Coordinate, Geocoder, Job, Stop, TourOptimizer, VehicleSpec};

/// A sequenced route plus a great-circle estimate of its total length.
#[derive(Debug, Clone)]
pub struct RouteSummary {
    pub addresses: Vec<String>,
    pub distance_km: f64,
}

/// Orchestrates the geocoder and tour optimizer into a single-vehicle route.
///
/// Both collaborators are injected, so tests can swap deterministic stubs
/// for the live backend without the sequencer noticing.
#[derive(Debug, Clone)]
pub struct RouteSequencer<G, T> {
    geocoder: G,
    optimizer: T,
}

impl<G: Geocoder, T: TourOptimizer> RouteSequencer<G, T> {
    pub fn new(geocoder: G, optimizer: T) -> Self {
        Self { geocoder, optimizer }
    }

    /// Reorders the input addresses into an approximate minimum-cost tour.
    ///
    /// The first address is pinned as the start and the last as the end;
    /// everything in between is up to the optimizer. The result is always a
    /// permutation of the input with the same length and the same first
    /// element. With exactly two addresses the optimizer is skipped and the
    /// input order is returned as-is (geocoding still runs as validation).
    ///
    /// Sequencing is all-or-nothing: any geocoding or optimization failure
    /// aborts the whole request and no partial route is returned.
    pub fn sequence(&self, addresses: &[String]) -> Result<Vec<String>, SequenceError> {
        Ok(self.sequence_stops(addresses)?.0)
    }

    /// Like [`RouteSequencer::sequence`], additionally estimating the route
    /// length from great-circle leg distances, for callers that need a
    /// `distance_km` trip feature without a directions service.
    pub fn sequence_with_distance(
        &self,
        addresses: &[String],
    ) -> Result<RouteSummary, SequenceError> {
        let (route, ordered) = self.sequence_stops(addresses)?;
        let legs: Vec<Coordinate> = ordered.iter().map(|stop| stop.location).collect();
        Ok(RouteSummary {
            addresses: route,
            distance_km: haversine::route_km(&legs),
        })
    }

    fn sequence_stops(
        &self,
        addresses: &[String],
    ) -> Result<(Vec<String>, Vec<Stop>), SequenceError> {
        if addresses.len() < 2 {
            return Err(SequenceError::InsufficientStops {
                got: addresses.len(),
            });
        }

        // Geocode in input order. Addresses may repeat, so the index is the
        // identity that travels through the optimizer and back.
        let mut stops = Vec::with_capacity(addresses.len());
        for (index, address) in addresses.iter().enumerate() {
            let location =
                self.geocoder
                    .geocode(address)
                    .map_err(|source| SequenceError::Geocode {
                        address: address.clone(),
                        source,
                    })?;
            stops.push(Stop {
                address_index: index,
                location,
            });
        }

        // Start and end are already the whole route; nothing to optimize.
        if addresses.len() == 2 {
            return Ok((addresses.to_vec(), stops));
        }

        let last = addresses.len() - 1;
        let vehicle = VehicleSpec {
            start: stops[0].location,
            end: stops[last].location,
        };
        let jobs: Vec<Job> = stops[1..last]
            .iter()
            .map(|stop| Job {
                id: stop.address_index,
                location: stop.location,
            })
            .collect();

        let tour = self.optimizer.optimize(&vehicle, &jobs)?;

        // The tour must visit every job exactly once and nothing else.
        let mut visited = tour.clone();
        visited.sort_unstable();
        let expected: Vec<usize> = (1..last).collect();
        if visited != expected {
            return Err(OptimizeFailure(format!(
                "tour {:?} is not a permutation of the {} jobs",
                tour,
                jobs.len()
            ))
            .into());
        }

        let mut route = Vec::with_capacity(addresses.len());
        let mut ordered = Vec::with_capacity(addresses.len());
        route.push(addresses[0].clone());
        ordered.push(stops[0]);
        for &id in &tour {
            route.push(addresses[id].clone());
            ordered.push(stops[id]);
        }
        route.push(addresses[last].clone());
        ordered.push(stops[last]);

        debug!(stops = route.len(), "sequenced route");
        Ok((route, ordered))
    }
}
