//! delivery-planner core
//!
//! Route sequencing against external geocoding/optimization services, and
//! delivery ETA estimation from an offline-trained regression model.

pub mod traits;
pub mod error;
pub mod sequencer;
pub mod ors;
pub mod ors_data;
pub mod haversine;
pub mod features;
pub mod forest;
pub mod artifact;
pub mod estimator;
pub mod training;
