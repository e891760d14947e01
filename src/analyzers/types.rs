//! Data types produced by the analysis pipeline.
//!
//! Each stage returns a fresh value; nothing here is mutated after it is built.
//! Field names follow the JSON consumed by the dashboard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Passenger load class. Ordering is the tie-break order for dominance votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoadCategory {
    Light,
    Medium,
    Heavy,
}

impl LoadCategory {
    pub const ALL: [LoadCategory; 3] = [LoadCategory::Light, LoadCategory::Medium, LoadCategory::Heavy];

    pub fn as_str(self) -> &'static str {
        match self {
            LoadCategory::Light => "LIGHT",
            LoadCategory::Medium => "MEDIUM",
            LoadCategory::Heavy => "HEAVY",
        }
    }
}

impl fmt::Display for LoadCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccelCategory {
    Gentle,
    Moderate,
    Aggressive,
}

impl AccelCategory {
    pub const ALL: [AccelCategory; 3] = [
        AccelCategory::Gentle,
        AccelCategory::Moderate,
        AccelCategory::Aggressive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AccelCategory::Gentle => "GENTLE",
            AccelCategory::Moderate => "MODERATE",
            AccelCategory::Aggressive => "AGGRESSIVE",
        }
    }
}

impl fmt::Display for AccelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "CRITICAL",
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceLevel {
    #[serde(rename = "NEEDS IMPROVEMENT")]
    NeedsImprovement,
    #[serde(rename = "FAIR")]
    Fair,
    #[serde(rename = "GOOD")]
    Good,
    #[serde(rename = "EXCELLENT")]
    Excellent,
}

/// Writes `None` as the `"UNKNOWN"` sentinel the dashboard expects.
pub(crate) fn unknown_if_none<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(v) => v.serialize(serializer),
        None => serializer.serialize_str("UNKNOWN"),
    }
}

/// Classification of a single passenger count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadClassification {
    pub category: LoadCategory,
    pub passenger_count: i64,
    pub capacity_percentage: f64,
    pub total_weight_kg: f64,
    pub weight_increase_percentage: f64,
    pub empty_weight_kg: f64,
    pub passenger_weight_kg: f64,
}

/// Load on the bus as it leaves one stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadSegment {
    pub segment_id: usize,
    pub stop_name: String,
    pub passenger_count: i64,
    pub load_category: LoadCategory,
    pub capacity_percentage: f64,
    pub total_weight_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadAnalysis {
    pub trip_id: String,
    #[serde(serialize_with = "unknown_if_none")]
    pub dominant_load_category: Option<LoadCategory>,
    pub max_passenger_count: i64,
    pub avg_passenger_count: f64,
    pub heavy_load_segments: usize,
    pub total_segments: usize,
    pub segments: Vec<LoadSegment>,
}

/// A positive speed change between two consecutive samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccelerationEvent {
    pub start_time: i64,
    pub end_time: i64,
    pub start_speed_kmh: f64,
    pub end_speed_kmh: f64,
    pub acceleration_ms2: f64,
    pub category: AccelCategory,
    pub segment: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SegmentAcceleration {
    pub segment_id: usize,
    #[serde(serialize_with = "unknown_if_none")]
    pub category: Option<AccelCategory>,
    pub avg_acceleration: f64,
    pub max_acceleration: f64,
    pub total_events: usize,
    pub gentle_count: usize,
    pub moderate_count: usize,
    pub aggressive_count: usize,
    pub acceleration_events: Vec<AccelerationEvent>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AccelerationAnalysis {
    pub trip_id: String,
    #[serde(serialize_with = "unknown_if_none")]
    pub dominant_pattern: Option<AccelCategory>,
    pub avg_acceleration: f64,
    pub max_acceleration: f64,
    pub total_events: usize,
    pub gentle_count: usize,
    pub gentle_percentage: f64,
    pub moderate_count: usize,
    pub moderate_percentage: f64,
    pub aggressive_count: usize,
    pub aggressive_percentage: f64,
    pub segments: Vec<SegmentAcceleration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentFuelEstimate {
    pub segment_id: usize,
    pub stop_name: String,
    pub load_category: LoadCategory,
    #[serde(serialize_with = "unknown_if_none")]
    pub accel_category: Option<AccelCategory>,
    pub distance_km: f64,
    pub fuel_rate_per_km: f64,
    pub total_fuel_liters: f64,
    pub optimal_fuel_liters: f64,
    pub excess_fuel_liters: f64,
    pub penalty_percentage: f64,
    pub is_optimal: bool,
    pub cost_sgd: f64,
}

impl SegmentFuelEstimate {
    /// HEAVY load combined with AGGRESSIVE acceleration.
    pub fn is_problem(&self) -> bool {
        self.load_category == LoadCategory::Heavy
            && self.accel_category == Some(AccelCategory::Aggressive)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TripFuelEstimate {
    pub trip_id: String,
    pub total_distance_km: f64,
    pub total_fuel_liters: f64,
    pub optimal_fuel_liters: f64,
    pub wasted_fuel_liters: f64,
    pub waste_percentage: f64,
    pub avg_fuel_per_km: f64,
    pub optimal_fuel_per_km: f64,
    pub total_cost_sgd: f64,
    pub wasted_cost_sgd: f64,
    pub problem_segments: usize,
    pub segments: Vec<SegmentFuelEstimate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TripFuelEstimate {
    /// A zeroed estimate for a trip whose upstream analyses were unusable.
    pub fn unavailable(trip_id: &str, error: &crate::error::TripError) -> Self {
        TripFuelEstimate {
            trip_id: trip_id.to_string(),
            error: Some(error.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSavings {
    pub segment_id: usize,
    pub stop_name: String,
    pub has_savings_potential: bool,
    pub wasted_fuel: f64,
    pub wasted_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TripSavings {
    pub trip_id: String,
    pub has_savings: bool,
    pub total_wasted_fuel: f64,
    pub total_wasted_cost: f64,
    pub waste_percentage: f64,
    pub heavy_aggressive_segments: usize,
    pub heavy_aggressive_waste: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_issue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    pub segments: Vec<SegmentSavings>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FleetSavings {
    pub period: String,
    pub total_trips: usize,
    pub trips_with_waste: usize,
    pub waste_percentage: f64,
    pub weekly_fuel_waste: f64,
    pub weekly_cost_waste: f64,
    pub annual_fuel_waste: f64,
    pub annual_cost_waste: f64,
    pub critical_trips: usize,
    pub high_priority_trips: usize,
    pub medium_priority_trips: usize,
    pub total_heavy_aggressive_segments: usize,
    pub avg_waste_per_trip: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetProjection {
    pub basis: String,
    pub projection_method: String,
    pub total_fleet_buses: u32,
    pub projected_annual_fuel_waste: f64,
    pub projected_annual_cost_waste: f64,
    pub cost_per_bus_per_year: f64,
    pub savings_if_50pct_adoption: f64,
    pub savings_if_80pct_adoption: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverReport {
    pub driver_id: String,
    pub total_trips: usize,
    pub total_fuel_wasted: f64,
    pub total_cost_wasted: f64,
    pub weekly_savings_potential: f64,
    pub annual_savings_potential: f64,
    pub critical_trips: usize,
    pub heavy_aggressive_segments: usize,
    pub performance_level: PerformanceLevel,
    pub feedback: String,
    pub recommended_action: String,
}

/// Everything the pipeline derives for one trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripAnalysis {
    pub trip_id: String,
    pub bus_id: String,
    pub driver_id: String,
    pub date: NaiveDate,
    pub is_peak: bool,
    pub load: LoadAnalysis,
    pub acceleration: AccelerationAnalysis,
    pub fuel: TripFuelEstimate,
    pub savings: TripSavings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadCategoryStats {
    pub count: usize,
    pub percentage: f64,
    pub avg_fuel_per_km: f64,
    pub total_fuel: f64,
}

/// Fleet-level summary written as `fleet_weekly_stats.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSummary {
    pub route: String,
    pub period: String,
    pub total_trips: usize,
    pub by_load_category: BTreeMap<LoadCategory, LoadCategoryStats>,
    pub fleet_savings: FleetSavings,
    pub sbs_fleet_projection: FleetProjection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatrixCell {
    pub fuel_per_km: f64,
    pub penalty_percentage: f64,
}

pub type FuelMatrix = BTreeMap<LoadCategory, BTreeMap<AccelCategory, MatrixCell>>;
