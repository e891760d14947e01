//! Picks representative trips for the dashboard's walkthrough.

use crate::analyzers::analyzer::process_trip;
use crate::analyzers::types::{AccelCategory, LoadCategory, TripAnalysis};
use crate::config::Config;
use crate::error::TripError;
use crate::simulator::wasteful_demo_trip;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DemoScenarios {
    pub light_load_optimal: Option<TripAnalysis>,
    pub heavy_load_optimal: Option<TripAnalysis>,
    pub heavy_load_wasteful: Option<TripAnalysis>,
}

impl DemoScenarios {
    fn is_complete(&self) -> bool {
        self.light_load_optimal.is_some()
            && self.heavy_load_optimal.is_some()
            && self.heavy_load_wasteful.is_some()
    }

    /// `(file name, trip)` for every scenario that was found.
    pub fn files(&self) -> Vec<(&'static str, &TripAnalysis)> {
        [
            ("scenario_light_load.json", &self.light_load_optimal),
            ("scenario_heavy_optimal.json", &self.heavy_load_optimal),
            ("scenario_heavy_wasteful.json", &self.heavy_load_wasteful),
        ]
        .into_iter()
        .filter_map(|(name, trip)| trip.as_ref().map(|t| (name, t)))
        .collect()
    }
}

/// First trip in input order matching each scenario. When no heavy-load
/// aggressive trip exists, the hand-built demo trip is processed instead.
pub fn select_scenarios(
    trips: &[TripAnalysis],
    config: &Config,
) -> Result<DemoScenarios, TripError> {
    let mut scenarios = DemoScenarios::default();

    for trip in trips {
        let load = trip.load.dominant_load_category;
        let accel = trip.acceleration.dominant_pattern;

        if scenarios.light_load_optimal.is_none() && load == Some(LoadCategory::Light) {
            scenarios.light_load_optimal = Some(trip.clone());
        }
        if scenarios.heavy_load_optimal.is_none()
            && load == Some(LoadCategory::Heavy)
            && accel == Some(AccelCategory::Gentle)
        {
            scenarios.heavy_load_optimal = Some(trip.clone());
        }
        if scenarios.heavy_load_wasteful.is_none()
            && load == Some(LoadCategory::Heavy)
            && accel == Some(AccelCategory::Aggressive)
        {
            scenarios.heavy_load_wasteful = Some(trip.clone());
        }

        if scenarios.is_complete() {
            break;
        }
    }

    if scenarios.heavy_load_wasteful.is_none() {
        warn!("No heavy-load aggressive trip in data, using demo trip");
        scenarios.heavy_load_wasteful = Some(process_trip(&wasteful_demo_trip(), config)?);
    }

    Ok(scenarios)
}
