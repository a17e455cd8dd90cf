//! Lazily loaded, cached model
//!
//! A `SharedModel` defers reading its artifact until the first prediction and
//! keeps the parsed model for as long as it lives. Held in a `static`, the load
//! happens at most once per process. A failed load is not cached; the next
//! prediction attempts it again.

use std::path::PathBuf;
use std::sync::OnceLock;

use super::{LinearSleepModel, SleepModel, DEFAULT_MODEL_JSON};
use crate::error::EstimateError;
use crate::types::{SleepFeatures, SleepPrediction};

/// Where a shared model reads its artifact from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// The artifact compiled into the library
    Embedded,
    /// An artifact file on disk
    Path(PathBuf),
    /// Artifact JSON supplied by the host
    Json(String),
}

/// Model loaded on first use and cached afterwards
#[derive(Debug)]
pub struct SharedModel {
    source: ModelSource,
    loaded: OnceLock<LinearSleepModel>,
}

impl SharedModel {
    pub const fn new(source: ModelSource) -> Self {
        Self {
            source,
            loaded: OnceLock::new(),
        }
    }

    /// Shared model backed by the embedded reference artifact
    pub const fn embedded() -> Self {
        Self::new(ModelSource::Embedded)
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(ModelSource::Path(path.into()))
    }

    pub fn source(&self) -> &ModelSource {
        &self.source
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// Get the cached model, loading it if this is the first use
    pub fn get(&self) -> Result<&LinearSleepModel, EstimateError> {
        if let Some(model) = self.loaded.get() {
            return Ok(model);
        }

        let model = self.load()?;
        Ok(self.loaded.get_or_init(move || model))
    }

    fn load(&self) -> Result<LinearSleepModel, EstimateError> {
        match &self.source {
            ModelSource::Embedded => {
                tracing::debug!("loading embedded sleep model");
                LinearSleepModel::from_json(DEFAULT_MODEL_JSON)
            }
            ModelSource::Path(path) => LinearSleepModel::from_path(path),
            ModelSource::Json(json) => LinearSleepModel::from_json(json),
        }
    }
}

impl SleepModel for SharedModel {
    fn predict(&self, features: &SleepFeatures) -> Result<SleepPrediction, EstimateError> {
        self.get()?.predict(features)
    }
}
