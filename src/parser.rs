//! JSON parser for trip records.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::error::{TripError, TripFailure};
use crate::model::Trip;

/// Decodes a JSON array of trips from raw bytes.
///
/// Each element is decoded and validated on its own, so one malformed record
/// yields a [`TripFailure`] in its slot instead of failing the whole file.
///
/// # Errors
///
/// Returns an error if the bytes are not JSON or the top level is not an array.
pub fn parse_trips(bytes: &[u8]) -> Result<Vec<Result<Trip, TripFailure>>> {
    let value: Value = serde_json::from_slice(bytes).context("input is not valid JSON")?;
    let Value::Array(records) = value else {
        anyhow::bail!("expected a JSON array of trips");
    };

    Ok(records
        .into_iter()
        .enumerate()
        .map(|(index, record)| parse_record(index, record))
        .collect())
}

fn parse_record(index: usize, record: Value) -> Result<Trip, TripFailure> {
    let trip_id = record
        .get("trip_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("record {index}"));

    let trip: Trip = serde_json::from_value(record)
        .map_err(|e| TripFailure::new(&trip_id, &TripError::Malformed(e.to_string())))?;
    trip.validate()
        .map_err(|e| TripFailure::new(&trip_id, &e))?;
    Ok(trip)
}
