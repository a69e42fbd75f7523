use std::collections::HashMap;

use delivery_planner::error::{GeocodeFailure, OptimizeFailure, SequenceError};
use delivery_planner::sequencer::RouteSequencer;
use delivery_planner::traits::{Coordinate, Geocoder, Job, TourOptimizer, VehicleSpec};

/// Geocoder backed by a fixed address table. Unknown addresses fail.
struct MockGeocoder {
    table: HashMap<String, Coordinate>,
}

impl MockGeocoder {
    fn with_cities(addresses: &[&str]) -> Self {
        let table = addresses
            .iter()
            .enumerate()
            .map(|(i, addr)| (addr.to_string(), Coordinate::new(i as f64, i as f64)))
            .collect();
        Self { table }
    }
}

impl Geocoder for MockGeocoder {
    fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeFailure> {
        self.table
            .get(address)
            .copied()
            .ok_or_else(|| GeocodeFailure(format!("no match for {address:?}")))
    }
}

/// Optimizer that returns a canned tour.
struct MockOptimizer {
    tour: Vec<usize>,
}

impl MockOptimizer {
    fn returning(tour: Vec<usize>) -> Self {
        Self { tour }
    }
}

impl TourOptimizer for MockOptimizer {
    fn optimize(
        &self,
        _vehicle: &VehicleSpec,
        _jobs: &[Job],
    ) -> Result<Vec<usize>, OptimizeFailure> {
        Ok(self.tour.clone())
    }
}

/// Optimizer that always fails, as an unreachable solver would.
struct FailingOptimizer;

impl TourOptimizer for FailingOptimizer {
    fn optimize(
        &self,
        _vehicle: &VehicleSpec,
        _jobs: &[Job],
    ) -> Result<Vec<usize>, OptimizeFailure> {
        Err(OptimizeFailure("solver unavailable".to_string()))
    }
}

/// Optimizer that panics if invoked at all.
struct UnreachableOptimizer;

impl TourOptimizer for UnreachableOptimizer {
    fn optimize(
        &self,
        _vehicle: &VehicleSpec,
        _jobs: &[Job],
    ) -> Result<Vec<usize>, OptimizeFailure> {
        panic!("optimizer must not be invoked for this input");
    }
}

fn addresses(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn reorders_intermediate_stops_per_optimizer_tour() {
    // Optimizer says: visit CityC (index 2), then CityB (index 1).
    let cities = ["CityA", "CityB", "CityC", "CityD"];
    let sequencer = RouteSequencer::new(
        MockGeocoder::with_cities(&cities),
        MockOptimizer::returning(vec![2, 1]),
    );

    let route = sequencer
        .sequence(&addresses(&cities))
        .expect("sequencing should succeed");

    assert_eq!(route, addresses(&["CityA", "CityC", "CityB", "CityD"]));
}

#[test]
fn two_addresses_pass_through_without_optimizer() {
    let cities = ["CityA", "CityB"];
    let sequencer = RouteSequencer::new(MockGeocoder::with_cities(&cities), UnreachableOptimizer);

    let route = sequencer
        .sequence(&addresses(&cities))
        .expect("two stops should sequence trivially");

    assert_eq!(route, addresses(&cities));
}

#[test]
fn two_addresses_are_still_geocoded_for_validation() {
    // CityB is unknown: even the trivial two-stop route must abort.
    let sequencer = RouteSequencer::new(
        MockGeocoder::with_cities(&["CityA"]),
        UnreachableOptimizer,
    );

    let err = sequencer
        .sequence(&addresses(&["CityA", "CityB"]))
        .unwrap_err();
    assert!(matches!(err, SequenceError::Geocode { .. }));
}

#[test]
fn fewer_than_two_addresses_is_insufficient() {
    let sequencer = RouteSequencer::new(
        MockGeocoder::with_cities(&["CityA"]),
        MockOptimizer::returning(vec![]),
    );

    let err = sequencer.sequence(&addresses(&["CityA"])).unwrap_err();
    assert!(matches!(err, SequenceError::InsufficientStops { got: 1 }));

    let err = sequencer.sequence(&[]).unwrap_err();
    assert!(matches!(err, SequenceError::InsufficientStops { got: 0 }));
}

#[test]
fn unresolvable_address_aborts_whole_request() {
    let sequencer = RouteSequencer::new(
        MockGeocoder::with_cities(&["CityA", "CityC", "CityD"]),
        MockOptimizer::returning(vec![2, 1]),
    );

    let err = sequencer
        .sequence(&addresses(&["CityA", "CityB", "CityC", "CityD"]))
        .unwrap_err();

    match err {
        SequenceError::Geocode { address, .. } => assert_eq!(address, "CityB"),
        other => panic!("expected Geocode error, got {other:?}"),
    }
}

#[test]
fn optimizer_failure_propagates_as_optimization_error() {
    let cities = ["CityA", "CityB", "CityC", "CityD"];
    let sequencer = RouteSequencer::new(MockGeocoder::with_cities(&cities), FailingOptimizer);

    let err = sequencer.sequence(&addresses(&cities)).unwrap_err();
    assert!(matches!(err, SequenceError::Optimization(_)));
}

#[test]
fn malformed_tour_is_an_optimization_error() {
    let cities = ["CityA", "CityB", "CityC", "CityD"];

    // Tour repeats a job.
    let sequencer = RouteSequencer::new(
        MockGeocoder::with_cities(&cities),
        MockOptimizer::returning(vec![1, 1]),
    );
    let err = sequencer.sequence(&addresses(&cities)).unwrap_err();
    assert!(matches!(err, SequenceError::Optimization(_)));

    // Tour references the pinned start.
    let sequencer = RouteSequencer::new(
        MockGeocoder::with_cities(&cities),
        MockOptimizer::returning(vec![0, 1]),
    );
    let err = sequencer.sequence(&addresses(&cities)).unwrap_err();
    assert!(matches!(err, SequenceError::Optimization(_)));

    // Tour drops a job.
    let sequencer = RouteSequencer::new(
        MockGeocoder::with_cities(&cities),
        MockOptimizer::returning(vec![2]),
    );
    let err = sequencer.sequence(&addresses(&cities)).unwrap_err();
    assert!(matches!(err, SequenceError::Optimization(_)));
}

#[test]
fn result_is_a_permutation_with_pinned_start_and_end() {
    let cities = ["Depot", "East", "West", "North", "South", "Home"];
    let sequencer = RouteSequencer::new(
        MockGeocoder::with_cities(&cities),
        MockOptimizer::returning(vec![4, 2, 1, 3]),
    );

    let input = addresses(&cities);
    let route = sequencer.sequence(&input).expect("sequencing should succeed");

    assert_eq!(route.len(), input.len());
    assert_eq!(route.first(), input.first());
    assert_eq!(route.last(), input.last());

    let mut sorted_route = route.clone();
    let mut sorted_input = input.clone();
    sorted_route.sort();
    sorted_input.sort();
    assert_eq!(sorted_route, sorted_input, "route must be a permutation");
}

#[test]
fn duplicate_addresses_stay_distinct_stops() {
    // Two stops share the text "CityB" but keep distinct indices 1 and 2.
    let geocoder = MockGeocoder::with_cities(&["CityA", "CityB", "CityD"]);
    let input = addresses(&["CityA", "CityB", "CityB", "CityD"]);
    let sequencer = RouteSequencer::new(geocoder, MockOptimizer::returning(vec![2, 1]));

    let route = sequencer.sequence(&input).expect("sequencing should succeed");
    assert_eq!(route, addresses(&["CityA", "CityB", "CityB", "CityD"]));
    assert_eq!(route.len(), 4, "duplicates are never deduplicated");
}

#[test]
fn sequence_with_distance_sums_great_circle_legs() {
    // Las Vegas and Los Angeles, ~370 km apart.
    let mut table = HashMap::new();
    table.insert("CityA".to_string(), Coordinate::new(-115.14, 36.17));
    table.insert("CityB".to_string(), Coordinate::new(-118.24, 34.05));

    let sequencer = RouteSequencer::new(MockGeocoder { table }, UnreachableOptimizer);
    let summary = sequencer
        .sequence_with_distance(&addresses(&["CityA", "CityB"]))
        .expect("sequencing should succeed");

    assert_eq!(summary.addresses, addresses(&["CityA", "CityB"]));
    assert!(
        summary.distance_km > 350.0 && summary.distance_km < 400.0,
        "expected ~370km, got {}",
        summary.distance_km
    );
}
