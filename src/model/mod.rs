//! Sleep regression models
//!
//! The estimator talks to its model through the `SleepModel` trait so the
//! trained artifact can be swapped for a stub in tests or for another backend
//! on a host platform.

mod linear;
mod shared;

pub use linear::{LinearSleepModel, ModelArtifact, ModelOutput, ARTIFACT_FORMAT_VERSION};
pub use shared::{ModelSource, SharedModel};

use crate::error::EstimateError;
use crate::types::{SleepFeatures, SleepPrediction};

/// Reference artifact embedded in the library
pub const DEFAULT_MODEL_JSON: &str = include_str!("../../models/sleep_calculator.json");

/// Trait for models that predict actual sleep from the form inputs
pub trait SleepModel {
    /// Run one forward pass
    fn predict(&self, features: &SleepFeatures) -> Result<SleepPrediction, EstimateError>;
}

impl<F> SleepModel for F
where
    F: Fn(&SleepFeatures) -> Result<SleepPrediction, EstimateError>,
{
    fn predict(&self, features: &SleepFeatures) -> Result<SleepPrediction, EstimateError> {
        self(features)
    }
}

/// Load the embedded reference model
pub fn default_model() -> Result<LinearSleepModel, EstimateError> {
    LinearSleepModel::from_json(DEFAULT_MODEL_JSON)
}
