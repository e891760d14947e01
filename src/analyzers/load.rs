//! Passenger load classification.

use crate::analyzers::types::{LoadAnalysis, LoadCategory, LoadClassification, LoadSegment};
use crate::analyzers::utility::{mean, round_to};
use crate::config::Config;
use crate::error::TripError;
use crate::model::{PassengerEvent, Trip};

/// Maps a passenger count onto a [`LoadCategory`].
///
/// | Passengers       | Category |
/// |------------------|----------|
/// | <= light_max     | LIGHT    |
/// | <= medium_max    | MEDIUM   |
/// | above            | HEAVY    |
pub fn category_for(passenger_count: i64, config: &Config) -> LoadCategory {
    match passenger_count {
        p if p <= config.load.light_max => LoadCategory::Light,
        p if p <= config.load.medium_max => LoadCategory::Medium,
        _ => LoadCategory::Heavy,
    }
}

/// Classifies a passenger count and derives the bus weight figures.
pub fn classify_load(
    passenger_count: i64,
    capacity: u32,
    config: &Config,
) -> Result<LoadClassification, TripError> {
    if passenger_count < 0 {
        return Err(TripError::NegativePassengerCount {
            count: passenger_count,
        });
    }

    let vehicle = &config.vehicle;
    let passenger_weight = passenger_count as f64 * vehicle.avg_passenger_weight_kg;
    let total_weight = vehicle.empty_weight_kg + passenger_weight;
    let weight_increase = if vehicle.empty_weight_kg == 0.0 {
        0.0
    } else {
        passenger_weight / vehicle.empty_weight_kg * 100.0
    };
    let capacity_pct = if capacity == 0 {
        0.0
    } else {
        passenger_count as f64 / capacity as f64 * 100.0
    };

    Ok(LoadClassification {
        category: category_for(passenger_count, config),
        passenger_count,
        capacity_percentage: round_to(capacity_pct, 1),
        total_weight_kg: total_weight,
        weight_increase_percentage: round_to(weight_increase, 1),
        empty_weight_kg: vehicle.empty_weight_kg,
        passenger_weight_kg: passenger_weight,
    })
}

/// One load record per stop, in stop order.
pub fn classify_trip_segments(
    events: &[PassengerEvent],
    config: &Config,
) -> Result<Vec<LoadSegment>, TripError> {
    events
        .iter()
        .enumerate()
        .map(|(i, event)| {
            let load = classify_load(event.total_onboard, config.vehicle.capacity, config)?;
            Ok(LoadSegment {
                segment_id: i,
                stop_name: event
                    .stop_name
                    .clone()
                    .unwrap_or_else(|| format!("Stop {i}")),
                passenger_count: event.total_onboard,
                load_category: load.category,
                capacity_percentage: load.capacity_percentage,
                total_weight_kg: load.total_weight_kg,
            })
        })
        .collect()
}

/// Most frequent category. Ties go to the earlier of LIGHT, MEDIUM, HEAVY.
pub fn dominant_category(segments: &[LoadSegment]) -> LoadCategory {
    let mut counts = [0usize; 3];
    for segment in segments {
        counts[segment.load_category as usize] += 1;
    }

    let mut dominant = LoadCategory::Light;
    for category in LoadCategory::ALL {
        if counts[category as usize] > counts[dominant as usize] {
            dominant = category;
        }
    }
    dominant
}

/// Full load analysis for a trip. A trip without passenger events yields an
/// `UNKNOWN` dominant category and zeroed statistics.
pub fn analyze_trip_load(trip: &Trip, config: &Config) -> Result<LoadAnalysis, TripError> {
    let segments = classify_trip_segments(&trip.passenger_events, config)?;

    if segments.is_empty() {
        return Ok(LoadAnalysis {
            trip_id: trip.trip_id.clone(),
            dominant_load_category: None,
            max_passenger_count: 0,
            avg_passenger_count: 0.0,
            heavy_load_segments: 0,
            total_segments: 0,
            segments,
        });
    }

    let counts: Vec<f64> = segments.iter().map(|s| s.passenger_count as f64).collect();
    let max_load = segments.iter().map(|s| s.passenger_count).max().unwrap_or(0);
    let heavy_segments = segments
        .iter()
        .filter(|s| s.load_category == LoadCategory::Heavy)
        .count();

    Ok(LoadAnalysis {
        trip_id: trip.trip_id.clone(),
        dominant_load_category: Some(dominant_category(&segments)),
        max_passenger_count: max_load,
        avg_passenger_count: round_to(mean(&counts), 1),
        heavy_load_segments: heavy_segments,
        total_segments: segments.len(),
        segments,
    })
}
