//! Fuel consumption estimates from load × acceleration pairings.
//!
//! Gentle driving at a given load burns the baseline rate. Harder acceleration
//! multiplies that rate by the configured penalty, and the difference between
//! the two is reported as excess (wasted) fuel.

use std::collections::BTreeMap;

use crate::analyzers::types::{
    AccelCategory, AccelerationAnalysis, FuelMatrix, LoadAnalysis, LoadCategory, MatrixCell,
    SegmentFuelEstimate, TripFuelEstimate,
};
use crate::analyzers::utility::{pct, ratio, round_to};
use crate::config::Config;
use crate::error::TripError;
use crate::model::Trip;

/// Fuel burned per km for a pairing, in L/km, rounded to 3 places.
pub fn fuel_per_km(load: LoadCategory, accel: Option<AccelCategory>, config: &Config) -> f64 {
    let baseline = config.fuel.baseline.rate(load);
    let penalty = config.fuel.penalties.multiplier(load, accel);
    round_to(baseline * penalty, 3)
}

/// Fuel a gentle driver would burn over `distance_km` at this load.
pub fn optimal_fuel(load: LoadCategory, distance_km: f64, config: &Config) -> f64 {
    round_to(config.fuel.baseline.rate(load) * distance_km, 3)
}

pub fn segment_estimate(
    load: LoadCategory,
    accel: Option<AccelCategory>,
    distance_km: f64,
    config: &Config,
) -> SegmentFuelEstimate {
    let rate = fuel_per_km(load, accel, config);
    let total = rate * distance_km;
    let optimal = optimal_fuel(load, distance_km, config);
    let excess = total - optimal;
    let penalty = config.fuel.penalties.multiplier(load, accel);

    SegmentFuelEstimate {
        segment_id: 0,
        stop_name: String::new(),
        load_category: load,
        accel_category: accel,
        distance_km,
        fuel_rate_per_km: rate,
        total_fuel_liters: round_to(total, 3),
        optimal_fuel_liters: optimal,
        excess_fuel_liters: round_to(excess, 3),
        penalty_percentage: round_to((penalty - 1.0) * 100.0, 1),
        is_optimal: accel == Some(AccelCategory::Gentle),
        cost_sgd: round_to(total * config.fuel.cost_per_liter, 2),
    }
}

/// Estimates fuel for a whole trip.
///
/// A trip with `n` stops has `n` load records but only `n - 1` segments, so
/// the final stop's load record is never paired. The trip distance is split
/// evenly across those `n - 1` segments.
pub fn estimate_trip_fuel(
    trip: &Trip,
    load: &LoadAnalysis,
    accel: &AccelerationAnalysis,
    config: &Config,
) -> Result<TripFuelEstimate, TripError> {
    let load_segments = &load.segments;
    let accel_segments = &accel.segments;

    if load_segments.is_empty() || accel_segments.is_empty() {
        return Err(TripError::MissingStage);
    }

    let num_segments = load_segments.len() - 1;
    let trip_distance = trip
        .total_distance_km
        .unwrap_or(config.fuel.default_distance_km);
    let segment_distance = ratio(trip_distance, num_segments as f64);

    let segments: Vec<SegmentFuelEstimate> = load_segments
        .iter()
        .zip(accel_segments)
        .take(num_segments)
        .enumerate()
        .map(|(i, (load_seg, accel_seg))| SegmentFuelEstimate {
            segment_id: i,
            stop_name: load_seg.stop_name.clone(),
            ..segment_estimate(
                load_seg.load_category,
                accel_seg.category,
                segment_distance,
                config,
            )
        })
        .collect();

    let total_distance = segment_distance * segments.len() as f64;
    let total_fuel: f64 = segments.iter().map(|s| s.total_fuel_liters).sum();
    let total_optimal: f64 = segments.iter().map(|s| s.optimal_fuel_liters).sum();
    let total_waste = total_fuel - total_optimal;
    let problem_segments = segments.iter().filter(|s| s.is_problem()).count();
    let cost_per_liter = config.fuel.cost_per_liter;

    Ok(TripFuelEstimate {
        trip_id: trip.trip_id.clone(),
        total_distance_km: round_to(total_distance, 1),
        total_fuel_liters: round_to(total_fuel, 2),
        optimal_fuel_liters: round_to(total_optimal, 2),
        wasted_fuel_liters: round_to(total_waste, 2),
        waste_percentage: round_to(pct(total_waste, total_optimal), 1),
        avg_fuel_per_km: round_to(ratio(total_fuel, total_distance), 3),
        optimal_fuel_per_km: round_to(ratio(total_optimal, total_distance), 3),
        total_cost_sgd: round_to(total_fuel * cost_per_liter, 2),
        wasted_cost_sgd: round_to(total_waste * cost_per_liter, 2),
        problem_segments,
        segments,
        error: None,
    })
}

/// The complete load × acceleration matrix of fuel rates.
pub fn impact_matrix(config: &Config) -> FuelMatrix {
    LoadCategory::ALL
        .into_iter()
        .map(|load| {
            let baseline = config.fuel.baseline.rate(load);
            let row: BTreeMap<AccelCategory, MatrixCell> = AccelCategory::ALL
                .into_iter()
                .map(|accel| {
                    let rate = fuel_per_km(load, Some(accel), config);
                    let cell = MatrixCell {
                        fuel_per_km: rate,
                        penalty_percentage: round_to(pct(rate - baseline, baseline), 1),
                    };
                    (accel, cell)
                })
                .collect();
            (load, row)
        })
        .collect()
}
