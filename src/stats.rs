use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::acceleration::summary;
use crate::analyzers::types::TripAnalysis;
use crate::error::TripFailure;

/// One flat CSV row per trip, successful or not.
#[derive(Debug, Default, Serialize)]
pub struct TripStats {
    pub processed_at: DateTime<Utc>,
    pub trip_id: String,
    pub bus_id: Option<String>,
    pub driver_id: Option<String>,
    pub date: Option<String>,
    pub is_peak: Option<bool>,

    // load
    pub dominant_load: Option<String>,
    pub max_passengers: Option<i64>,
    pub avg_passengers: Option<f64>,

    // acceleration
    pub accel_pattern: Option<String>,
    pub aggressive_pct: Option<f64>,
    pub accel_summary: Option<String>,

    // fuel
    pub total_fuel_liters: Option<f64>,
    pub wasted_fuel_liters: Option<f64>,
    pub waste_pct: Option<f64>,
    pub wasted_cost: Option<f64>,
    pub problem_segments: Option<usize>,
    pub priority: Option<String>,

    // error tracking
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

impl TripStats {
    pub fn from_analysis(analysis: &TripAnalysis) -> Self {
        let category_name = |c: Option<&str>| c.unwrap_or("UNKNOWN").to_string();

        TripStats {
            processed_at: Utc::now(),
            trip_id: analysis.trip_id.clone(),
            bus_id: Some(analysis.bus_id.clone()),
            driver_id: Some(analysis.driver_id.clone()),
            date: Some(analysis.date.format("%Y-%m-%d").to_string()),
            is_peak: Some(analysis.is_peak),
            dominant_load: Some(category_name(
                analysis.load.dominant_load_category.map(|c| c.as_str()),
            )),
            max_passengers: Some(analysis.load.max_passenger_count),
            avg_passengers: Some(analysis.load.avg_passenger_count),
            accel_pattern: Some(category_name(
                analysis.acceleration.dominant_pattern.map(|c| c.as_str()),
            )),
            aggressive_pct: Some(analysis.acceleration.aggressive_percentage),
            accel_summary: Some(summary(&analysis.acceleration)),
            total_fuel_liters: Some(analysis.fuel.total_fuel_liters),
            wasted_fuel_liters: Some(analysis.fuel.wasted_fuel_liters),
            waste_pct: Some(analysis.fuel.waste_percentage),
            wasted_cost: Some(analysis.fuel.wasted_cost_sgd),
            problem_segments: Some(analysis.fuel.problem_segments),
            priority: analysis.savings.priority.map(|p| p.as_str().to_string()),
            error_type: None,
            error_message: analysis.fuel.error.clone(),
        }
    }

    /// Create an error record for a trip that could not be processed
    pub fn from_error(failure: &TripFailure) -> Self {
        TripStats {
            processed_at: Utc::now(),
            trip_id: failure.trip_id.clone(),
            error_type: Some(failure.error_type.clone()),
            error_message: Some(failure.reason.clone()),
            ..Default::default()
        }
    }
}
