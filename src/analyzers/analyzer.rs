use crate::analyzers::acceleration::analyze_trip_acceleration;
use crate::analyzers::fuel::estimate_trip_fuel;
use crate::analyzers::load::analyze_trip_load;
use crate::analyzers::savings::trip_savings;
use crate::analyzers::types::{TripAnalysis, TripFuelEstimate};
use crate::config::Config;
use crate::error::{TripError, TripFailure};
use crate::model::Trip;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Runs one trip through load, acceleration, fuel and savings analysis.
///
/// Invalid input rejects the trip. A fuel stage that cannot run because an
/// upstream analysis came back empty does not: the trip keeps a zeroed fuel
/// estimate carrying the error, and its savings degrade to "no savings".
pub fn process_trip(trip: &Trip, config: &Config) -> Result<TripAnalysis, TripError> {
    trip.validate()?;

    let load = analyze_trip_load(trip, config)?;
    let acceleration = analyze_trip_acceleration(trip, config);

    let fuel = match estimate_trip_fuel(trip, &load, &acceleration, config) {
        Ok(fuel) => fuel,
        Err(e) => {
            debug!(trip_id = %trip.trip_id, error = %e, "Fuel estimate unavailable");
            TripFuelEstimate::unavailable(&trip.trip_id, &e)
        }
    };
    let savings = trip_savings(&fuel, config);

    Ok(TripAnalysis {
        trip_id: trip.trip_id.clone(),
        bus_id: trip.bus_id.clone(),
        driver_id: trip.driver_id.clone(),
        date: trip.date,
        is_peak: trip.is_peak,
        load,
        acceleration,
        fuel,
        savings,
    })
}

/// Results of a batch run. Both lists keep input order.
#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    pub processed: Vec<TripAnalysis>,
    pub failures: Vec<TripFailure>,
}

/// Processes a batch in parallel. Records that already failed to parse are
/// carried through as failures; a failing trip never stops the others.
#[tracing::instrument(skip_all, fields(records = records.len()))]
pub fn process_batch(records: Vec<Result<Trip, TripFailure>>, config: &Config) -> BatchOutcome {
    let results: Vec<Result<TripAnalysis, TripFailure>> = records
        .into_par_iter()
        .map(|record| {
            let trip = record?;
            process_trip(&trip, config).map_err(|e| {
                warn!(trip_id = %trip.trip_id, error = %e, "Trip rejected");
                TripFailure::new(&trip.trip_id, &e)
            })
        })
        .collect();

    let mut outcome = BatchOutcome::default();
    for result in results {
        match result {
            Ok(analysis) => outcome.processed.push(analysis),
            Err(failure) => outcome.failures.push(failure),
        }
    }

    info!(
        processed = outcome.processed.len(),
        failed = outcome.failures.len(),
        "Batch complete"
    );
    outcome
}

/// Convenience wrapper for already-decoded trips.
pub fn process_trips(trips: &[Trip], config: &Config) -> BatchOutcome {
    process_batch(trips.iter().cloned().map(Ok).collect(), config)
}
