//! Input form state
//!
//! Holds the three values the bedtime screen edits, with the screen's defaults
//! and stepper behavior. Rendering is left to the host.

use serde::{Deserialize, Serialize};

use crate::alert::BedtimeAlert;
use crate::estimator::BedtimeEstimator;
use crate::model::SleepModel;
use crate::types::{CoffeeIntake, SleepAmount, WakeTime, SLEEP_STEP_HOURS};

/// Default wake-up hour shown when the form opens
pub const DEFAULT_WAKE_HOUR: u32 = 7;
/// Default desired sleep (hours)
pub const DEFAULT_SLEEP_HOURS: f64 = 8.0;
/// Default coffee intake (cups)
pub const DEFAULT_COFFEE_CUPS: u32 = 1;

/// Values of the bedtime form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepForm {
    pub wake: WakeTime,
    pub sleep: SleepAmount,
    pub coffee: CoffeeIntake,
}

impl Default for SleepForm {
    fn default() -> Self {
        Self {
            wake: WakeTime::from_time(
                chrono::NaiveTime::from_hms_opt(DEFAULT_WAKE_HOUR, 0, 0).unwrap_or_default(),
            ),
            sleep: SleepAmount::clamped(DEFAULT_SLEEP_HOURS),
            coffee: CoffeeIntake::clamped(DEFAULT_COFFEE_CUPS),
        }
    }
}

impl SleepForm {
    pub fn set_wake(&mut self, wake: WakeTime) {
        self.wake = wake;
    }

    pub fn increment_sleep(&mut self) {
        self.sleep = SleepAmount::clamped(self.sleep.hours() + SLEEP_STEP_HOURS);
    }

    pub fn decrement_sleep(&mut self) {
        self.sleep = SleepAmount::clamped(self.sleep.hours() - SLEEP_STEP_HOURS);
    }

    pub fn increment_coffee(&mut self) {
        self.coffee = CoffeeIntake::clamped(self.coffee.cups().saturating_add(1));
    }

    pub fn decrement_coffee(&mut self) {
        self.coffee = CoffeeIntake::clamped(self.coffee.cups().saturating_sub(1));
    }

    /// Stepper label, e.g. "8 hours" or "8.25 hours"
    pub fn sleep_label(&self) -> String {
        format!("{} hours", self.sleep.hours())
    }

    /// Stepper label, e.g. "1 cup(s)"
    pub fn coffee_label(&self) -> String {
        format!("{} cup(s)", self.coffee.cups())
    }

    /// Run the estimation for the current values. Always yields an alert.
    pub fn calculate<M: SleepModel + ?Sized>(&self, model: &M) -> BedtimeAlert {
        BedtimeEstimator::new(model).alert(self.wake, self.sleep, self.coffee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EstimateError;
    use crate::model::{ModelSource, SharedModel, DEFAULT_MODEL_JSON};
    use crate::types::{SleepFeatures, SleepPrediction};
    use std::fs;

    #[test]
    fn test_defaults() {
        let form = SleepForm::default();
        assert_eq!(form.wake.to_string(), "07:00");
        assert_eq!(form.sleep_label(), "8 hours");
        assert_eq!(form.coffee_label(), "1 cup(s)");
    }

    #[test]
    fn test_sleep_stepper_clamps() {
        let mut form = SleepForm::default();
        form.increment_sleep();
        assert_eq!(form.sleep_label(), "8.25 hours");

        for _ in 0..100 {
            form.increment_sleep();
        }
        assert_eq!(form.sleep.hours(), 12.0);

        for _ in 0..100 {
            form.decrement_sleep();
        }
        assert_eq!(form.sleep.hours(), 4.0);
        assert_eq!(form.sleep_label(), "4 hours");
    }

    #[test]
    fn test_coffee_stepper_clamps() {
        let mut form = SleepForm::default();
        form.decrement_coffee();
        form.decrement_coffee();
        assert_eq!(form.coffee.cups(), 0);

        for _ in 0..30 {
            form.increment_coffee();
        }
        assert_eq!(form.coffee_label(), "20 cup(s)");
    }

    static PROCESS_MODEL: SharedModel = SharedModel::embedded();

    #[test]
    fn test_calculate_with_embedded_model() {
        let form = SleepForm::default();
        let alert = form.calculate(&SharedModel::embedded());

        assert!(alert.success);
        assert_eq!(alert.message, "22:45");
    }

    #[test]
    fn test_calculate_keeps_process_model_loaded() {
        let mut form = SleepForm::default();

        let first = form.calculate(&PROCESS_MODEL);
        assert!(first.success);
        assert!(PROCESS_MODEL.is_loaded());

        form.increment_coffee();
        let second = form.calculate(&PROCESS_MODEL);
        assert!(second.success);
        assert!(PROCESS_MODEL.is_loaded());
        assert_eq!(PROCESS_MODEL.source(), &ModelSource::Embedded);
    }

    #[test]
    fn test_repeated_calculate_survives_removed_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SleepCalculator.json");
        fs::write(&path, DEFAULT_MODEL_JSON).unwrap();
        let model = SharedModel::from_path(&path);
        let form = SleepForm::default();

        assert!(form.calculate(&model).success);
        fs::remove_file(&path).unwrap();
        assert!(form.calculate(&model).success);
    }

    #[test]
    fn test_calculate_failure_is_alert() {
        let broken = |_: &SleepFeatures| -> Result<SleepPrediction, EstimateError> {
            Err(EstimateError::Prediction("boom".to_string()))
        };

        let alert = SleepForm::default().calculate(&broken);
        assert!(!alert.success);
        assert_eq!(alert.title, "Error");
    }

    #[test]
    fn test_form_json() {
        let form: SleepForm =
            serde_json::from_str(r#"{"wake": "06:30", "sleep": 7.5, "coffee": 2}"#).unwrap();
        assert_eq!(form.wake.seconds_of_day(), 23_400);
        assert_eq!(form.sleep.hours(), 7.5);

        let invalid = serde_json::from_str::<SleepForm>(r#"{"wake": "06:30", "sleep": 7.6, "coffee": 2}"#);
        assert!(invalid.is_err());
    }
}
