//! Core types for bedtime estimation
//!
//! This module defines the values that flow through one estimation: the three
//! form inputs, the feature vector handed to the model, the model's prediction
//! and the resulting bedtime.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EstimateError;

/// Seconds in one day
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Shortest selectable sleep amount (hours)
pub const SLEEP_MIN_HOURS: f64 = 4.0;
/// Longest selectable sleep amount (hours)
pub const SLEEP_MAX_HOURS: f64 = 12.0;
/// Sleep stepper granularity (hours)
pub const SLEEP_STEP_HOURS: f64 = 0.25;

/// Lowest selectable coffee intake (cups per day)
pub const COFFEE_MIN_CUPS: u32 = 0;
/// Highest selectable coffee intake (cups per day)
pub const COFFEE_MAX_CUPS: u32 = 20;

/// Model input names, in the order the model expects them
pub const FEATURE_NAMES: [&str; 3] = ["wake", "estimatedSleep", "coffee"];

/// Clock format used for wake times and bedtimes
const CLOCK_FORMAT: &str = "%H:%M";

/// Desired wake-up time. Only the hour and minute are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WakeTime {
    hour: u32,
    minute: u32,
}

impl WakeTime {
    /// Build a wake time from hour (0-23) and minute (0-59)
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, EstimateError> {
        if hour > 23 || minute > 59 {
            return Err(EstimateError::InvalidInput(format!(
                "wake time {hour:02}:{minute:02} is not a valid clock time"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Take the hour and minute of a clock time, dropping seconds
    pub fn from_time(time: NaiveTime) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
        }
    }

    /// Build a wake time from seconds since midnight. Leftover seconds are dropped.
    pub fn from_seconds_of_day(seconds: u32) -> Result<Self, EstimateError> {
        if seconds >= SECONDS_PER_DAY {
            return Err(EstimateError::InvalidInput(format!(
                "wake offset {seconds}s is outside one day"
            )));
        }
        Ok(Self {
            hour: seconds / 3600,
            minute: (seconds % 3600) / 60,
        })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Seconds since midnight: `hour * 3600 + minute * 60`
    pub fn seconds_of_day(&self) -> u32 {
        self.hour * 3600 + self.minute * 60
    }

    /// The wake time as a clock time
    pub fn as_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for WakeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for WakeTime {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), CLOCK_FORMAT)
            .map(Self::from_time)
            .map_err(|e| EstimateError::InvalidInput(format!("wake time '{s}': {e}")))
    }
}

impl TryFrom<String> for WakeTime {
    type Error = EstimateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WakeTime> for String {
    fn from(value: WakeTime) -> Self {
        value.to_string()
    }
}

/// Desired nightly sleep in hours, within the selectable range and on a quarter-hour step
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct SleepAmount(f64);

impl SleepAmount {
    pub fn new(hours: f64) -> Result<Self, EstimateError> {
        if !hours.is_finite() || !(SLEEP_MIN_HOURS..=SLEEP_MAX_HOURS).contains(&hours) {
            return Err(EstimateError::InvalidInput(format!(
                "sleep amount {hours} is outside {SLEEP_MIN_HOURS}-{SLEEP_MAX_HOURS} hours"
            )));
        }
        let steps = hours / SLEEP_STEP_HOURS;
        if (steps - steps.round()).abs() > 1e-9 {
            return Err(EstimateError::InvalidInput(format!(
                "sleep amount {hours} is not a multiple of {SLEEP_STEP_HOURS} hours"
            )));
        }
        Ok(Self(hours))
    }

    /// Clamp into the selectable range and snap to the nearest step
    pub fn clamped(hours: f64) -> Self {
        let hours = if hours.is_nan() {
            SLEEP_MIN_HOURS
        } else {
            hours.clamp(SLEEP_MIN_HOURS, SLEEP_MAX_HOURS)
        };
        Self((hours / SLEEP_STEP_HOURS).round() * SLEEP_STEP_HOURS)
    }

    pub fn hours(&self) -> f64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for SleepAmount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hours = f64::deserialize(deserializer)?;
        Self::new(hours).map_err(serde::de::Error::custom)
    }
}

/// Daily coffee intake in cups
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CoffeeIntake(u32);

impl CoffeeIntake {
    pub fn new(cups: u32) -> Result<Self, EstimateError> {
        if !(COFFEE_MIN_CUPS..=COFFEE_MAX_CUPS).contains(&cups) {
            return Err(EstimateError::InvalidInput(format!(
                "coffee intake {cups} is outside {COFFEE_MIN_CUPS}-{COFFEE_MAX_CUPS} cups"
            )));
        }
        Ok(Self(cups))
    }

    /// Clamp into the selectable range
    pub fn clamped(cups: u32) -> Self {
        Self(cups.clamp(COFFEE_MIN_CUPS, COFFEE_MAX_CUPS))
    }

    pub fn cups(&self) -> u32 {
        self.0
    }
}

impl<'de> Deserialize<'de> for CoffeeIntake {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let cups = u32::deserialize(deserializer)?;
        Self::new(cups).map_err(serde::de::Error::custom)
    }
}

/// Feature vector passed to the model.
///
/// Units match the training data: `wake` in seconds since midnight,
/// `estimated_sleep` in hours, `coffee` in cups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepFeatures {
    pub wake: f64,
    pub estimated_sleep: f64,
    pub coffee: f64,
}

impl SleepFeatures {
    pub fn new(wake_seconds_of_day: u32, desired_sleep_hours: f64, coffee_cups: u32) -> Self {
        Self {
            wake: f64::from(wake_seconds_of_day),
            estimated_sleep: desired_sleep_hours,
            coffee: f64::from(coffee_cups),
        }
    }

    /// Values in `FEATURE_NAMES` order
    pub fn as_array(&self) -> [f64; 3] {
        [self.wake, self.estimated_sleep, self.coffee]
    }
}

/// Unit of the model's `actualSleep` output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputUnit {
    Seconds,
    Minutes,
    Hours,
}

impl OutputUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputUnit::Seconds => "seconds",
            OutputUnit::Minutes => "minutes",
            OutputUnit::Hours => "hours",
        }
    }

    /// Convert a value in this unit to seconds
    pub fn to_seconds(&self, value: f64) -> f64 {
        match self {
            OutputUnit::Seconds => value,
            OutputUnit::Minutes => value * 60.0,
            OutputUnit::Hours => value * 3600.0,
        }
    }
}

/// Predicted actual sleep, tagged with the unit the model produced it in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepPrediction {
    pub actual_sleep: f64,
    pub unit: OutputUnit,
}

impl SleepPrediction {
    pub fn new(actual_sleep: f64, unit: OutputUnit) -> Self {
        Self { actual_sleep, unit }
    }

    pub fn seconds(value: f64) -> Self {
        Self::new(value, OutputUnit::Seconds)
    }

    pub fn hours(value: f64) -> Self {
        Self::new(value, OutputUnit::Hours)
    }

    /// Predicted actual sleep in seconds
    pub fn as_seconds(&self) -> f64 {
        self.unit.to_seconds(self.actual_sleep)
    }
}

/// Estimated ideal bedtime (clock time only)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bedtime {
    #[serde(serialize_with = "clock::serialize")]
    time: NaiveTime,
    predicted_sleep_seconds: f64,
}

impl Bedtime {
    pub(crate) fn new(time: NaiveTime, predicted_sleep_seconds: f64) -> Self {
        Self {
            time,
            predicted_sleep_seconds,
        }
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    pub fn minute(&self) -> u32 {
        self.time.minute()
    }

    /// Model output the bedtime was derived from, in seconds
    pub fn predicted_sleep_seconds(&self) -> f64 {
        self.predicted_sleep_seconds
    }
}

impl fmt::Display for Bedtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.time.format(CLOCK_FORMAT))
    }
}

/// `HH:MM` serialization for clock times
mod clock {
    use chrono::NaiveTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(super::CLOCK_FORMAT))
    }
}
