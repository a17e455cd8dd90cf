//! Linear regression model loaded from a JSON artifact
//!
//! Formula: `actualSleep = intercept + Σ coefficient[name] * input[name]`,
//! evaluated in the unit the artifact declares for its output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::SleepModel;
use crate::error::EstimateError;
use crate::types::{OutputUnit, SleepFeatures, SleepPrediction, FEATURE_NAMES};

/// Artifact format understood by this loader
pub const ARTIFACT_FORMAT_VERSION: &str = "sleep-model.v1";

const LINEAR_KIND: &str = "linear_regression";
const OUTPUT_NAME: &str = "actualSleep";

/// Declared model output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub name: String,
    pub unit: OutputUnit,
}

/// On-disk model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: String,
    pub name: String,
    pub kind: String,
    /// Input names, in the order the model was trained with
    pub inputs: Vec<String>,
    pub output: ModelOutput,
    pub intercept: f64,
    pub coefficients: BTreeMap<String, f64>,
}

impl ModelArtifact {
    /// Check that the artifact matches the feature contract of the estimator
    pub fn validate(&self) -> Result<(), EstimateError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(EstimateError::ModelLoad(format!(
                "unsupported format_version '{}', expected '{ARTIFACT_FORMAT_VERSION}'",
                self.format_version
            )));
        }

        if self.kind != LINEAR_KIND {
            return Err(EstimateError::ModelLoad(format!(
                "unsupported model kind '{}'",
                self.kind
            )));
        }

        if self.inputs.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(EstimateError::ModelLoad(format!(
                "model inputs {:?} do not match {:?}",
                self.inputs, FEATURE_NAMES
            )));
        }

        if self.output.name != OUTPUT_NAME {
            return Err(EstimateError::ModelLoad(format!(
                "model output '{}' is not '{OUTPUT_NAME}'",
                self.output.name
            )));
        }

        if !self.intercept.is_finite() {
            return Err(EstimateError::ModelLoad("intercept is not finite".to_string()));
        }

        for name in FEATURE_NAMES {
            match self.coefficients.get(name) {
                Some(value) if value.is_finite() => {}
                Some(_) => {
                    return Err(EstimateError::ModelLoad(format!(
                        "coefficient '{name}' is not finite"
                    )))
                }
                None => {
                    return Err(EstimateError::ModelLoad(format!(
                        "missing coefficient '{name}'"
                    )))
                }
            }
        }

        Ok(())
    }
}

/// Linear regression over the three form features
#[derive(Debug, Clone)]
pub struct LinearSleepModel {
    artifact: ModelArtifact,
    /// Coefficients in `FEATURE_NAMES` order
    weights: [f64; 3],
}

impl LinearSleepModel {
    /// Build a model from an already parsed artifact
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, EstimateError> {
        artifact.validate()?;

        let mut weights = [0.0; 3];
        for (weight, name) in weights.iter_mut().zip(FEATURE_NAMES) {
            *weight = artifact.coefficients.get(name).copied().unwrap_or_default();
        }

        Ok(Self { artifact, weights })
    }

    /// Parse and validate an artifact from JSON
    pub fn from_json(json: &str) -> Result<Self, EstimateError> {
        let artifact: ModelArtifact = serde_json::from_str(json)?;
        Self::from_artifact(artifact)
    }

    /// Read, parse and validate an artifact file
    pub fn from_path(path: &Path) -> Result<Self, EstimateError> {
        let json = fs::read_to_string(path)?;
        let model = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            name = %model.artifact.name,
            "loaded sleep model artifact"
        );
        Ok(model)
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn output_unit(&self) -> OutputUnit {
        self.artifact.output.unit
    }
}

impl SleepModel for LinearSleepModel {
    fn predict(&self, features: &SleepFeatures) -> Result<SleepPrediction, EstimateError> {
        let inputs = features.as_array();
        if let Some(position) = inputs.iter().position(|v| !v.is_finite()) {
            return Err(EstimateError::Prediction(format!(
                "input '{}' is not finite",
                FEATURE_NAMES[position]
            )));
        }

        let actual_sleep = self
            .weights
            .iter()
            .zip(inputs)
            .fold(self.artifact.intercept, |acc, (w, x)| acc + w * x);

        if !actual_sleep.is_finite() {
            return Err(EstimateError::Prediction(
                "model produced a non-finite prediction".to_string(),
            ));
        }

        Ok(SleepPrediction::new(actual_sleep, self.output_unit()))
    }
}
