//! BetterRest - On-device bedtime estimation
//!
//! Estimates the ideal bedtime from three inputs: the desired wake-up time, the
//! desired amount of sleep and the daily coffee intake. A pre-trained linear
//! regression predicts how much sleep the user will actually get; the bedtime
//! is the wake time minus that prediction, as a clock time.
//!
//! ## Modules
//!
//! - **Estimator**: one forward pass through a `SleepModel` plus the subtraction
//! - **Model**: regression artifact loading, validation and process-wide caching
//! - **Form / Alert**: input defaults and the user-facing result

pub mod alert;
pub mod error;
pub mod estimator;
pub mod form;
pub mod model;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use alert::BedtimeAlert;
pub use error::EstimateError;
pub use estimator::{estimate_bedtime, BedtimeEstimator};
pub use form::SleepForm;
pub use model::{default_model, LinearSleepModel, SharedModel, SleepModel};
pub use types::{Bedtime, CoffeeIntake, SleepAmount, SleepFeatures, SleepPrediction, WakeTime};

/// Library version
pub const BETTERREST_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "betterrest";
