//! Bedtime estimation
//!
//! This module provides the public estimation API. One estimation is a single
//! forward pass through the sleep model followed by subtracting the predicted
//! actual sleep from the wake time, keeping only the clock time.

use chrono::NaiveTime;

use crate::alert::BedtimeAlert;
use crate::error::EstimateError;
use crate::model::SleepModel;
use crate::types::{
    Bedtime, CoffeeIntake, SleepAmount, SleepFeatures, WakeTime, SECONDS_PER_DAY,
};

const MILLIS_PER_DAY: i64 = SECONDS_PER_DAY as i64 * 1000;

/// Estimate the ideal bedtime from raw form values.
///
/// # Arguments
/// * `model` - Sleep model to run
/// * `wake_seconds_of_day` - Wake time as `hour * 3600 + minute * 60`
/// * `desired_sleep_hours` - Desired sleep amount in hours
/// * `coffee_cups` - Daily coffee intake in cups
///
/// # Returns
/// The bedtime as a clock time; wraps to the previous day when the predicted
/// sleep reaches back past midnight.
///
/// # Example
/// ```ignore
/// let model = betterrest::model::default_model()?;
/// let bedtime = estimate_bedtime(&model, 25_200, 8.0, 1)?;
/// println!("Your ideal bedtime is {bedtime}");
/// ```
pub fn estimate_bedtime<M: SleepModel + ?Sized>(
    model: &M,
    wake_seconds_of_day: u32,
    desired_sleep_hours: f64,
    coffee_cups: u32,
) -> Result<Bedtime, EstimateError> {
    if wake_seconds_of_day >= SECONDS_PER_DAY {
        return Err(EstimateError::InvalidInput(format!(
            "wake offset {wake_seconds_of_day}s is outside one day"
        )));
    }

    let features = SleepFeatures::new(wake_seconds_of_day, desired_sleep_hours, coffee_cups);
    let prediction = model.predict(&features)?;
    let predicted_seconds = prediction.as_seconds();

    if !predicted_seconds.is_finite() {
        return Err(EstimateError::Prediction(format!(
            "predicted sleep {} {} is not finite",
            prediction.actual_sleep,
            prediction.unit.as_str()
        )));
    }

    let time = clock_time_before(wake_seconds_of_day, predicted_seconds);
    tracing::debug!(
        wake = wake_seconds_of_day,
        estimated_sleep = desired_sleep_hours,
        coffee = coffee_cups,
        predicted_seconds,
        bedtime = %time.format("%H:%M"),
        "estimated bedtime"
    );

    Ok(Bedtime::new(time, predicted_seconds))
}

/// Clock time `seconds` before `wake_seconds_of_day`, wrapping across midnight.
/// Millisecond precision is kept so display truncation matches wall-clock math.
fn clock_time_before(wake_seconds_of_day: u32, seconds: f64) -> NaiveTime {
    let offset_millis = (seconds.rem_euclid(f64::from(SECONDS_PER_DAY)) * 1000.0).round() as i64;
    let millis = (i64::from(wake_seconds_of_day) * 1000 - offset_millis).rem_euclid(MILLIS_PER_DAY);

    NaiveTime::from_num_seconds_from_midnight_opt(
        (millis / 1000) as u32,
        ((millis % 1000) * 1_000_000) as u32,
    )
    .unwrap_or(NaiveTime::MIN)
}

/// Estimator bound to one borrowed model, e.g. a `static SharedModel` that
/// stays loaded across button presses.
pub struct BedtimeEstimator<'m, M: ?Sized> {
    model: &'m M,
}

impl<'m, M: SleepModel + ?Sized> BedtimeEstimator<'m, M> {
    pub fn new(model: &'m M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &'m M {
        self.model
    }

    /// Estimate from validated form inputs
    pub fn estimate(
        &self,
        wake: WakeTime,
        sleep: SleepAmount,
        coffee: CoffeeIntake,
    ) -> Result<Bedtime, EstimateError> {
        estimate_bedtime(self.model, wake.seconds_of_day(), sleep.hours(), coffee.cups())
    }

    /// Estimate from raw values without enforcing the form's input ranges
    pub fn estimate_raw(
        &self,
        wake_seconds_of_day: u32,
        desired_sleep_hours: f64,
        coffee_cups: u32,
    ) -> Result<Bedtime, EstimateError> {
        estimate_bedtime(self.model, wake_seconds_of_day, desired_sleep_hours, coffee_cups)
    }

    /// Estimate and convert the outcome into the alert shown to the user.
    /// Failures never leave this call as errors.
    pub fn alert(&self, wake: WakeTime, sleep: SleepAmount, coffee: CoffeeIntake) -> BedtimeAlert {
        let result = self.estimate(wake, sleep, coffee);
        if let Err(e) = &result {
            tracing::warn!(error = %e, wake = %wake, "bedtime estimation failed");
        }
        BedtimeAlert::from_result(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{default_model, SharedModel, DEFAULT_MODEL_JSON};
    use crate::types::SleepPrediction;
    use chrono::{Duration, NaiveDate};
    use std::cell::Cell;
    use std::fs;

    fn stub_hours(hours: f64) -> impl Fn(&SleepFeatures) -> Result<SleepPrediction, EstimateError> {
        move |_| Ok(SleepPrediction::hours(hours))
    }

    fn failing_model(_: &SleepFeatures) -> Result<SleepPrediction, EstimateError> {
        Err(EstimateError::ModelLoad("artifact missing".to_string()))
    }

    #[test]
    fn test_model_receives_features_in_order() {
        let seen = Cell::new(None);
        let recording = |features: &SleepFeatures| -> Result<SleepPrediction, EstimateError> {
            seen.set(Some(features.as_array()));
            Ok(SleepPrediction::hours(8.0))
        };

        let wake = WakeTime::from_hm(7, 0).unwrap();
        estimate_bedtime(&recording, wake.seconds_of_day(), 8.0, 1).unwrap();

        assert_eq!(seen.get(), Some([25_200.0, 8.0, 1.0]));
    }

    #[test]
    fn test_seven_am_scenario() {
        let wake = WakeTime::from_hm(7, 0).unwrap();
        let bedtime = estimate_bedtime(&stub_hours(8.0), wake.seconds_of_day(), 8.0, 1).unwrap();
        assert_eq!(bedtime.to_string(), "23:00");

        let text = bedtime.to_string();
        assert_eq!(text.len(), 5);
        assert_eq!(&text[2..3], ":");

        // On the calendar the bedtime falls before the wake-up
        let wake_at = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_time(wake.as_time());
        let bed_at = wake_at - Duration::seconds(bedtime.predicted_sleep_seconds() as i64);
        assert!(bed_at < wake_at);
        assert_eq!(bed_at.time(), bedtime.time());
    }

    #[test]
    fn test_bedtime_before_wake_same_day() {
        let wake = WakeTime::from_hm(23, 0).unwrap();
        let bedtime = estimate_bedtime(&stub_hours(7.5), wake.seconds_of_day(), 8.0, 1).unwrap();
        assert_eq!(bedtime.to_string(), "15:30");
        assert!(bedtime.time() < wake.as_time());
    }

    #[test]
    fn test_wraps_across_midnight() {
        let wake = WakeTime::from_hm(0, 30).unwrap();
        let bedtime = estimate_bedtime(&stub_hours(8.0), wake.seconds_of_day(), 8.0, 1).unwrap();
        assert_eq!(bedtime.to_string(), "16:30");
        assert_eq!(bedtime.hour(), 16);
        assert_eq!(bedtime.minute(), 30);
    }

    #[test]
    fn test_prediction_longer_than_a_day_wraps() {
        let bedtime = estimate_bedtime(&stub_hours(30.0), 25_200, 12.0, 0).unwrap();
        // 07:00 - 30h = 01:00 two days earlier
        assert_eq!(bedtime.to_string(), "01:00");
    }

    #[test]
    fn test_fractional_seconds_truncate_to_minute() {
        let model = |_: &SleepFeatures| -> Result<SleepPrediction, EstimateError> {
            Ok(SleepPrediction::seconds(29_700.4))
        };
        let bedtime = estimate_bedtime(&model, 25_200, 8.0, 1).unwrap();
        // 07:00:00 - 29700.4s = 22:44:59.6
        assert_eq!(bedtime.to_string(), "22:44");
    }

    #[test]
    fn test_default_model_seven_am() {
        let model = default_model().unwrap();
        let bedtime = estimate_bedtime(&model, 25_200, 8.0, 1).unwrap();

        // 480 + 3540 * 8 + 900 * 1 = 29700s = 8h15m
        assert_eq!(bedtime.to_string(), "22:45");
        assert_eq!(bedtime.predicted_sleep_seconds(), 29_700.0);
    }

    #[test]
    fn test_deterministic() {
        let model = default_model().unwrap();
        let a = estimate_bedtime(&model, 23_400, 9.25, 3).unwrap();
        let b = estimate_bedtime(&model, 23_400, 9.25, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_domain_edges_do_not_error() {
        let model = default_model().unwrap();
        let estimator = BedtimeEstimator::new(&model);
        let wake = WakeTime::from_hm(6, 15).unwrap();

        for hours in [4.0, 12.0] {
            for cups in [0, 20] {
                let sleep = SleepAmount::new(hours).unwrap();
                let coffee = CoffeeIntake::new(cups).unwrap();
                assert!(estimator.estimate(wake, sleep, coffee).is_ok());
            }
        }
    }

    #[test]
    fn test_failure_is_returned_not_panicked() {
        let result = estimate_bedtime(&failing_model, 25_200, 8.0, 1);
        assert!(result.unwrap_err().is_model_load());
    }

    #[test]
    fn test_missing_artifact_fails() {
        let dir = tempfile::tempdir().unwrap();
        let shared = SharedModel::from_path(dir.path().join("SleepCalculator.json"));
        let estimator = BedtimeEstimator::new(&shared);

        let result = estimator.estimate_raw(25_200, 8.0, 1);
        assert!(result.is_err());
        assert!(!estimator.model().is_loaded());
    }

    #[test]
    fn test_estimator_reuses_cached_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SleepCalculator.json");
        fs::write(&path, DEFAULT_MODEL_JSON).unwrap();

        let shared = SharedModel::from_path(&path);
        let estimator = BedtimeEstimator::new(&shared);
        assert!(estimator.estimate_raw(25_200, 8.0, 1).is_ok());

        // The artifact is gone but the loaded model stays in use
        fs::remove_file(&path).unwrap();
        let bedtime = estimator.estimate_raw(25_200, 8.0, 1).unwrap();
        assert_eq!(bedtime.to_string(), "22:45");
        assert!(estimator.model().is_loaded());
    }

    #[test]
    fn test_non_finite_prediction_fails() {
        let model = |_: &SleepFeatures| -> Result<SleepPrediction, EstimateError> {
            Ok(SleepPrediction::hours(f64::INFINITY))
        };
        let err = estimate_bedtime(&model, 25_200, 8.0, 1).unwrap_err();
        assert!(matches!(err, EstimateError::Prediction(_)));
    }

    #[test]
    fn test_wake_offset_out_of_range() {
        let err = estimate_bedtime(&stub_hours(8.0), SECONDS_PER_DAY, 8.0, 1).unwrap_err();
        assert!(matches!(err, EstimateError::InvalidInput(_)));
    }

    #[test]
    fn test_alert_converts_failure() {
        let estimator = BedtimeEstimator::new(&failing_model);
        let alert = estimator.alert(
            WakeTime::from_hm(7, 0).unwrap(),
            SleepAmount::new(8.0).unwrap(),
            CoffeeIntake::new(1).unwrap(),
        );

        assert!(!alert.success);
        assert_eq!(alert.message, "Sorry, there was a problem calculating your bedtime");
    }
}
