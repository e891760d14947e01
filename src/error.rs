//! Per-trip error types.
//!
//! Nothing in here is fatal to a batch: a [`TripError`] rejects one trip and is
//! recorded as a [`TripFailure`] next to the successful analyses.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TripError {
    #[error("negative passenger count {count}")]
    NegativePassengerCount { count: i64 },
    #[error("negative {field} ({value}) at stop {stop}")]
    NegativeFlow {
        stop: usize,
        field: &'static str,
        value: i64,
    },
    #[error("malformed timestamp {timestamp} at speed sample {index}")]
    MalformedTimestamp { index: usize, timestamp: i64 },
    #[error("invalid speed {speed} km/h at speed sample {index}")]
    InvalidSpeed { index: usize, speed: f64 },
    #[error("invalid trip distance {0} km")]
    InvalidDistance(f64),
    #[error("malformed trip record: {0}")]
    Malformed(String),
    #[error("Missing load or acceleration data")]
    MissingStage,
}

impl TripError {
    /// Short machine-readable kind, used in CSV rows and failure records.
    pub fn kind(&self) -> &'static str {
        match self {
            TripError::NegativePassengerCount { .. }
            | TripError::NegativeFlow { .. }
            | TripError::MalformedTimestamp { .. }
            | TripError::InvalidSpeed { .. }
            | TripError::InvalidDistance(_) => "invalid_input",
            TripError::Malformed(_) => "parse_error",
            TripError::MissingStage => "missing_stage",
        }
    }
}

/// A trip that could not be analysed, with the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripFailure {
    pub trip_id: String,
    pub error_type: String,
    pub reason: String,
}

impl TripFailure {
    pub fn new(trip_id: impl Into<String>, error: &TripError) -> Self {
        Self {
            trip_id: trip_id.into(),
            error_type: error.kind().to_string(),
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_carries_kind_and_reason() {
        let failure = TripFailure::new(
            "T1",
            &TripError::NegativeFlow {
                stop: 3,
                field: "boarding",
                value: -2,
            },
        );

        assert_eq!(failure.trip_id, "T1");
        assert_eq!(failure.error_type, "invalid_input");
        assert_eq!(failure.reason, "negative boarding (-2) at stop 3");
    }

    #[test]
    fn test_missing_stage_message() {
        assert_eq!(
            TripError::MissingStage.to_string(),
            "Missing load or acceleration data"
        );
        assert_eq!(TripError::MissingStage.kind(), "missing_stage");
    }
}
