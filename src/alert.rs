//! User-facing presentation of an estimation outcome

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EstimateError, USER_FAILURE_MESSAGE};
use crate::types::Bedtime;

/// Alert title on success
pub const SUCCESS_TITLE: &str = "Your ideal bedtime is...";
/// Alert title on failure
pub const FAILURE_TITLE: &str = "Error";

/// Title and message the caller shows after pressing "Calculate"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedtimeAlert {
    pub title: String,
    pub message: String,
    pub success: bool,
}

impl BedtimeAlert {
    pub fn success(bedtime: &Bedtime) -> Self {
        Self {
            title: SUCCESS_TITLE.to_string(),
            message: bedtime.to_string(),
            success: true,
        }
    }

    pub fn failure(error: &EstimateError) -> Self {
        Self {
            title: FAILURE_TITLE.to_string(),
            message: error.user_message().to_string(),
            success: false,
        }
    }

    pub fn from_result(result: &Result<Bedtime, EstimateError>) -> Self {
        match result {
            Ok(bedtime) => Self::success(bedtime),
            Err(e) => Self::failure(e),
        }
    }

    /// One-line form, e.g. "Your ideal bedtime is 22:45"
    pub fn summary(&self) -> String {
        if self.success {
            format!("Your ideal bedtime is {}", self.message)
        } else {
            USER_FAILURE_MESSAGE.to_string()
        }
    }
}

impl fmt::Display for BedtimeAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.title, self.message)
    }
}
