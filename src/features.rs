//! Trip features and the categorical encoder shared by training and
//! inference.

use serde::{Deserialize, Serialize};

/// Raw description of one delivery trip.
///
/// The categorical fields are open text labels, not a fixed enum: historical
/// data decides which values exist, and new values may show up at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub distance_km: f64,
    pub num_stops: u32,
    pub weather: String,
    pub time_of_day: String,
    pub traffic_level: String,
}

/// Number of categorical fields on [`Trip`].
const CATEGORICAL_FIELDS: usize = 3;

fn categorical_values(trip: &Trip) -> [&str; CATEGORICAL_FIELDS] {
    [&trip.weather, &trip.time_of_day, &trip.traffic_level]
}

/// One-hot encoder fitted once at training time and persisted inside the
/// model artifact.
///
/// Each categorical field contributes one indicator column per distinct
/// label observed during fitting, in sorted order. A label never seen at fit
/// time encodes as all zeros (the unknown bucket) instead of failing, so
/// prediction degrades gracefully on new conditions. Numeric fields pass
/// through unchanged. The encoder is never refit at inference time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// Sorted distinct labels per categorical field.
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    /// Fits the encoder by recording the sorted distinct labels of every
    /// categorical field in `trips`.
    pub fn fit(trips: &[Trip]) -> Self {
        let mut categories = Vec::with_capacity(CATEGORICAL_FIELDS);
        for field in 0..CATEGORICAL_FIELDS {
            let mut labels: Vec<String> = trips
                .iter()
                .map(|trip| categorical_values(trip)[field].to_string())
                .collect();
            labels.sort();
            labels.dedup();
            categories.push(labels);
        }
        Self { categories }
    }

    /// Width of the encoded feature vector: two numeric columns plus one
    /// indicator per fitted label.
    pub fn width(&self) -> usize {
        2 + self.categories.iter().map(Vec::len).sum::<usize>()
    }

    /// Encodes a trip as `[distance_km, num_stops, indicators...]`.
    ///
    /// Deterministic for a given fitted encoder: the same trip always yields
    /// the same vector, across process restarts.
    pub fn transform(&self, trip: &Trip) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.width());
        row.push(trip.distance_km);
        row.push(f64::from(trip.num_stops));

        let values = categorical_values(trip);
        for (labels, value) in self.categories.iter().zip(values) {
            let hit = labels.iter().position(|label| label == value);
            for slot in 0..labels.len() {
                row.push(if hit == Some(slot) { 1.0 } else { 0.0 });
            }
        }
        row
    }
}
