//! Error types for bedtime estimation

use thiserror::Error;

/// Message shown to the user whenever an estimation fails, whatever the cause.
pub const USER_FAILURE_MESSAGE: &str = "Sorry, there was a problem calculating your bedtime";

/// Errors that can occur while loading a model or estimating a bedtime
#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("Failed to load sleep model: {0}")]
    ModelLoad(String),

    #[error("Invalid model JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl EstimateError {
    /// The static user-facing message. Every cause is reported the same way.
    pub fn user_message(&self) -> &'static str {
        USER_FAILURE_MESSAGE
    }

    /// True when the failure came from obtaining the model rather than running it.
    pub fn is_model_load(&self) -> bool {
        matches!(
            self,
            EstimateError::ModelLoad(_) | EstimateError::Json(_) | EstimateError::Io(_)
        )
    }
}
