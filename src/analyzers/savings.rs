//! Turns fuel waste into prioritised recommendations and cost projections.

use crate::analyzers::grade::performance_level;
use crate::analyzers::types::{
    AccelCategory, DriverReport, FleetProjection, FleetSavings, LoadCategory, PerformanceLevel,
    Priority, SegmentFuelEstimate, SegmentSavings, TripFuelEstimate, TripSavings,
};
use crate::analyzers::utility::{pct, ratio, round_to};
use crate::config::Config;

/// Priority of a wasteful segment.
///
/// | Load   | Acceleration | Priority |
/// |--------|--------------|----------|
/// | HEAVY  | AGGRESSIVE   | CRITICAL |
/// | HEAVY  | MODERATE     | HIGH     |
/// | MEDIUM | AGGRESSIVE   | MEDIUM   |
/// | other  | other        | LOW      |
pub fn segment_priority(load: LoadCategory, accel: Option<AccelCategory>) -> Priority {
    match (load, accel) {
        (LoadCategory::Heavy, Some(AccelCategory::Aggressive)) => Priority::Critical,
        (LoadCategory::Heavy, Some(AccelCategory::Moderate)) => Priority::High,
        (LoadCategory::Medium, Some(AccelCategory::Aggressive)) => Priority::Medium,
        _ => Priority::Low,
    }
}

fn segment_recommendation(priority: Priority, estimate: &SegmentFuelEstimate) -> String {
    let penalty = estimate.penalty_percentage;
    match priority {
        Priority::Critical => format!(
            "CRITICAL: Heavy load ({}) with aggressive acceleration wastes {penalty}%. Use GENTLE acceleration immediately.",
            estimate.load_category
        ),
        Priority::High => format!(
            "Heavy load detected. Switch to GENTLE acceleration to eliminate {penalty}% waste."
        ),
        Priority::Medium => {
            "Medium load with aggressive acceleration. Use moderate or gentle acceleration.".into()
        }
        Priority::Low => "Minor optimization possible. Consider gentler acceleration.".into(),
    }
}

pub fn segment_savings(estimate: &SegmentFuelEstimate, config: &Config) -> SegmentSavings {
    let excess = estimate.excess_fuel_liters;

    if excess <= 0.0 {
        return SegmentSavings {
            segment_id: estimate.segment_id,
            stop_name: estimate.stop_name.clone(),
            has_savings_potential: false,
            wasted_fuel: 0.0,
            wasted_cost: 0.0,
            priority: None,
            recommendation: "Already optimal".into(),
        };
    }

    let priority = segment_priority(estimate.load_category, estimate.accel_category);

    SegmentSavings {
        segment_id: estimate.segment_id,
        stop_name: estimate.stop_name.clone(),
        has_savings_potential: true,
        wasted_fuel: round_to(excess, 3),
        wasted_cost: round_to(excess * config.fuel.cost_per_liter, 2),
        priority: Some(priority),
        recommendation: segment_recommendation(priority, estimate),
    }
}

/// Savings for one trip. A trip with no positive waste, including one whose
/// fuel estimate failed upstream, reports no savings.
pub fn trip_savings(fuel: &TripFuelEstimate, config: &Config) -> TripSavings {
    if fuel.wasted_fuel_liters <= 0.0 {
        return TripSavings {
            trip_id: fuel.trip_id.clone(),
            has_savings: false,
            recommendation: Some("Trip is already optimally driven".into()),
            ..Default::default()
        };
    }

    let segments: Vec<SegmentSavings> = fuel
        .segments
        .iter()
        .map(|s| segment_savings(s, config))
        .collect();

    let problems: Vec<&SegmentFuelEstimate> =
        fuel.segments.iter().filter(|s| s.is_problem()).collect();
    let heavy_aggressive = problems.len();
    let heavy_aggressive_waste: f64 = problems.iter().map(|s| s.excess_fuel_liters).sum();

    let (priority, main_issue, main_action) = if heavy_aggressive > 0 {
        (
            Priority::Critical,
            format!("{heavy_aggressive} segment(s) with HEAVY load + AGGRESSIVE acceleration"),
            "Use GENTLE acceleration when passenger count exceeds 60",
        )
    } else if fuel.problem_segments > 0 {
        (
            Priority::High,
            "Multiple segments with suboptimal load/acceleration combinations".to_string(),
            "Adjust acceleration based on current passenger load",
        )
    } else {
        (
            Priority::Medium,
            "Minor inefficiencies across trip".to_string(),
            "Generally use gentler acceleration",
        )
    };

    TripSavings {
        trip_id: fuel.trip_id.clone(),
        has_savings: true,
        total_wasted_fuel: round_to(fuel.wasted_fuel_liters, 2),
        total_wasted_cost: round_to(fuel.wasted_cost_sgd, 2),
        waste_percentage: fuel.waste_percentage,
        heavy_aggressive_segments: heavy_aggressive,
        heavy_aggressive_waste: round_to(heavy_aggressive_waste, 2),
        priority: Some(priority),
        main_issue: Some(main_issue),
        main_action: Some(main_action.to_string()),
        recommendation: None,
        segments,
    }
}

/// Weekly and annualised waste across a set of trips.
pub fn fleet_savings(trips: &[&TripSavings], config: &Config) -> FleetSavings {
    let total_trips = trips.len();
    let weeks = config.savings.weeks_per_year;

    let trips_with_waste = trips.iter().filter(|t| t.has_savings).count();
    let weekly_fuel: f64 = trips.iter().map(|t| t.total_wasted_fuel).sum();
    let weekly_cost: f64 = trips.iter().map(|t| t.total_wasted_cost).sum();
    let count_priority =
        |p: Priority| trips.iter().filter(|t| t.priority == Some(p)).count();

    FleetSavings {
        period: "Weekly".into(),
        total_trips,
        trips_with_waste,
        waste_percentage: round_to(pct(trips_with_waste as f64, total_trips as f64), 1),
        weekly_fuel_waste: round_to(weekly_fuel, 1),
        weekly_cost_waste: round_to(weekly_cost, 2),
        annual_fuel_waste: round_to(weekly_fuel * weeks, 1),
        annual_cost_waste: round_to(weekly_cost * weeks, 2),
        critical_trips: count_priority(Priority::Critical),
        high_priority_trips: count_priority(Priority::High),
        medium_priority_trips: count_priority(Priority::Medium),
        total_heavy_aggressive_segments: trips.iter().map(|t| t.heavy_aggressive_segments).sum(),
        avg_waste_per_trip: round_to(ratio(weekly_fuel, total_trips as f64), 2),
    }
}

/// Extrapolates one route's annual waste to the whole fleet.
pub fn project_fleet_wide_impact(route_savings: &FleetSavings, config: &Config) -> FleetProjection {
    let savings = &config.savings;
    let route_multiplier = savings.num_routes as f64 * savings.route_applicability;

    let annual_fuel = route_savings.annual_fuel_waste * route_multiplier;
    let annual_cost = route_savings.annual_cost_waste * route_multiplier;

    FleetProjection {
        basis: format!("Route {} ({})", config.report.route, config.report.period),
        projection_method: format!(
            "Extrapolated to {} routes ({}% applicability)",
            savings.num_routes,
            round_to(savings.route_applicability * 100.0, 0)
        ),
        total_fleet_buses: savings.num_buses,
        projected_annual_fuel_waste: round_to(annual_fuel, 0),
        projected_annual_cost_waste: round_to(annual_cost, 0),
        cost_per_bus_per_year: round_to(ratio(annual_cost, savings.num_buses as f64), 2),
        savings_if_50pct_adoption: round_to(annual_cost * 0.5, 0),
        savings_if_80pct_adoption: round_to(annual_cost * 0.8, 0),
    }
}

/// Weekly performance report for one driver.
pub fn driver_report(driver_id: &str, trips: &[&TripSavings], config: &Config) -> DriverReport {
    let total_trips = trips.len();
    let total_waste: f64 = trips.iter().map(|t| t.total_wasted_fuel).sum();
    let total_cost: f64 = trips.iter().map(|t| t.total_wasted_cost).sum();
    let critical_trips = trips
        .iter()
        .filter(|t| t.priority == Some(Priority::Critical))
        .count();

    let weekly = round_to(total_cost, 2);
    let level = performance_level(total_waste, critical_trips, config);

    let (feedback, action) = match level {
        PerformanceLevel::NeedsImprovement => (
            format!(
                "{critical_trips} trips with critical waste (Heavy load + Aggressive acceleration)"
            ),
            "Primary focus: Use GENTLE acceleration when passenger count >60",
        ),
        PerformanceLevel::Fair => (
            format!("Some inefficiency detected across {total_trips} trips"),
            "Be more mindful of current passenger load when accelerating",
        ),
        PerformanceLevel::Good => (
            "Minor optimization opportunities".to_string(),
            "Continue current practices, small improvements possible",
        ),
        PerformanceLevel::Excellent => (
            "Excellent fuel-efficient driving!".to_string(),
            "Maintain current practices",
        ),
    };

    DriverReport {
        driver_id: driver_id.to_string(),
        total_trips,
        total_fuel_wasted: round_to(total_waste, 2),
        total_cost_wasted: round_to(total_cost, 2),
        weekly_savings_potential: weekly,
        annual_savings_potential: round_to(weekly * config.savings.weeks_per_year, 2),
        critical_trips,
        heavy_aggressive_segments: trips.iter().map(|t| t.heavy_aggressive_segments).sum(),
        performance_level: level,
        feedback,
        recommended_action: action.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::fuel::segment_estimate;

    fn estimate(
        segment_id: usize,
        load: LoadCategory,
        accel: AccelCategory,
        distance: f64,
    ) -> SegmentFuelEstimate {
        SegmentFuelEstimate {
            segment_id,
            stop_name: format!("Stop {segment_id}"),
            ..segment_estimate(load, Some(accel), distance, &Config::default())
        }
    }

    fn trip_fuel(segments: Vec<SegmentFuelEstimate>) -> TripFuelEstimate {
        let total: f64 = segments.iter().map(|s| s.total_fuel_liters).sum();
        let optimal: f64 = segments.iter().map(|s| s.optimal_fuel_liters).sum();
        TripFuelEstimate {
            trip_id: "T001".into(),
            total_fuel_liters: round_to(total, 2),
            optimal_fuel_liters: round_to(optimal, 2),
            wasted_fuel_liters: round_to(total - optimal, 2),
            wasted_cost_sgd: round_to((total - optimal) * 1.5, 2),
            waste_percentage: round_to(pct(total - optimal, optimal), 1),
            problem_segments: segments.iter().filter(|s| s.is_problem()).count(),
            segments,
            ..Default::default()
        }
    }

    fn savings_with(priority: Option<Priority>, fuel: f64, cost: f64) -> TripSavings {
        TripSavings {
            trip_id: "T".into(),
            has_savings: fuel > 0.0,
            total_wasted_fuel: fuel,
            total_wasted_cost: cost,
            heavy_aggressive_segments: usize::from(priority == Some(Priority::Critical)),
            priority,
            ..Default::default()
        }
    }

    #[test]
    fn test_priority_table() {
        use AccelCategory::*;
        use LoadCategory::*;
        assert_eq!(segment_priority(Heavy, Some(Aggressive)), Priority::Critical);
        assert_eq!(segment_priority(Heavy, Some(Moderate)), Priority::High);
        assert_eq!(segment_priority(Medium, Some(Aggressive)), Priority::Medium);
        assert_eq!(segment_priority(Medium, Some(Moderate)), Priority::Low);
        assert_eq!(segment_priority(Light, Some(Aggressive)), Priority::Low);
        assert_eq!(segment_priority(Heavy, None), Priority::Low);
    }

    #[test]
    fn test_heavy_aggressive_segment_is_critical() {
        let config = Config::default();
        let seg = estimate(0, LoadCategory::Heavy, AccelCategory::Aggressive, 1.5);

        let savings = segment_savings(&seg, &config);

        assert!(savings.has_savings_potential);
        assert_eq!(savings.priority, Some(Priority::Critical));
        assert_eq!(savings.wasted_fuel, 0.255);
        assert_eq!(savings.wasted_cost, 0.38);
        assert_eq!(
            savings.recommendation,
            "CRITICAL: Heavy load (HEAVY) with aggressive acceleration wastes 17.3%. Use GENTLE acceleration immediately."
        );
    }

    #[test]
    fn test_gentle_segment_already_optimal() {
        let config = Config::default();
        let seg = estimate(2, LoadCategory::Heavy, AccelCategory::Gentle, 1.5);

        let savings = segment_savings(&seg, &config);

        assert!(!savings.has_savings_potential);
        assert_eq!(savings.priority, None);
        assert_eq!(savings.recommendation, "Already optimal");
        assert_eq!(savings.segment_id, 2);
    }

    #[test]
    fn test_trip_with_problem_segment_is_critical() {
        use AccelCategory::*;
        use LoadCategory::*;
        let config = Config::default();
        let fuel = trip_fuel(vec![
            estimate(0, Light, Gentle, 1.5),
            estimate(1, Heavy, Aggressive, 1.5),
            estimate(2, Heavy, Aggressive, 1.5),
        ]);

        let savings = trip_savings(&fuel, &config);

        assert!(savings.has_savings);
        assert_eq!(savings.priority, Some(Priority::Critical));
        assert_eq!(savings.heavy_aggressive_segments, 2);
        assert_eq!(savings.heavy_aggressive_waste, 0.51);
        assert_eq!(
            savings.main_issue.as_deref(),
            Some("2 segment(s) with HEAVY load + AGGRESSIVE acceleration")
        );
        assert_eq!(savings.segments.len(), 3);
        assert!(!savings.segments[0].has_savings_potential);
    }

    #[test]
    fn test_trip_minor_waste_is_medium() {
        use AccelCategory::*;
        use LoadCategory::*;
        let config = Config::default();
        let fuel = trip_fuel(vec![
            estimate(0, Medium, Moderate, 3.8),
            estimate(1, Heavy, Moderate, 3.8),
        ]);

        let savings = trip_savings(&fuel, &config);

        assert_eq!(savings.priority, Some(Priority::Medium));
        assert_eq!(savings.main_action.as_deref(), Some("Generally use gentler acceleration"));
        assert_eq!(savings.segments[1].priority, Some(Priority::High));
    }

    #[test]
    fn test_optimal_trip_has_no_savings() {
        let config = Config::default();
        let fuel = trip_fuel(vec![estimate(0, LoadCategory::Heavy, AccelCategory::Gentle, 3.0)]);

        let savings = trip_savings(&fuel, &config);

        assert!(!savings.has_savings);
        assert_eq!(savings.priority, None);
        assert_eq!(
            savings.recommendation.as_deref(),
            Some("Trip is already optimally driven")
        );
        assert!(savings.segments.is_empty());
    }

    #[test]
    fn test_fleet_savings_empty() {
        let config = Config::default();
        let fleet = fleet_savings(&[], &config);

        assert_eq!(fleet.period, "Weekly");
        assert_eq!(fleet.total_trips, 0);
        assert_eq!(fleet.waste_percentage, 0.0);
        assert_eq!(fleet.weekly_fuel_waste, 0.0);
        assert_eq!(fleet.annual_cost_waste, 0.0);
        assert_eq!(fleet.avg_waste_per_trip, 0.0);
    }

    #[test]
    fn test_fleet_savings_totals() {
        let config = Config::default();
        let a = savings_with(Some(Priority::Critical), 1.08, 1.62);
        let b = savings_with(Some(Priority::Medium), 0.5, 0.75);
        let c = savings_with(None, 0.0, 0.0);

        let fleet = fleet_savings(&[&a, &b, &c], &config);

        assert_eq!(fleet.total_trips, 3);
        assert_eq!(fleet.trips_with_waste, 2);
        assert_eq!(fleet.waste_percentage, 66.7);
        assert_eq!(fleet.weekly_fuel_waste, 1.6);
        assert_eq!(fleet.weekly_cost_waste, 2.37);
        assert_eq!(fleet.annual_cost_waste, 123.24);
        assert_eq!(fleet.critical_trips, 1);
        assert_eq!(fleet.medium_priority_trips, 1);
        assert_eq!(fleet.total_heavy_aggressive_segments, 1);
        assert_eq!(fleet.avg_waste_per_trip, 0.53);
    }

    #[test]
    fn test_projection() {
        let config = Config::default();
        let route = FleetSavings {
            annual_fuel_waste: 1000.0,
            annual_cost_waste: 1500.0,
            ..Default::default()
        };

        let projection = project_fleet_wide_impact(&route, &config);

        assert_eq!(projection.projected_annual_fuel_waste, 101_600.0);
        assert_eq!(projection.projected_annual_cost_waste, 152_400.0);
        assert_eq!(projection.cost_per_bus_per_year, 46.18);
        assert_eq!(projection.savings_if_50pct_adoption, 76_200.0);
        assert_eq!(projection.savings_if_80pct_adoption, 121_920.0);
        assert_eq!(projection.basis, "Route 12 (Week of Dec 16-20, 2024)");
        assert_eq!(
            projection.projection_method,
            "Extrapolated to 127 routes (80% applicability)"
        );
    }

    #[test]
    fn test_projection_zero_buses() {
        let mut config = Config::default();
        config.savings.num_buses = 0;
        let route = FleetSavings {
            annual_cost_waste: 10.0,
            ..Default::default()
        };
        assert_eq!(project_fleet_wide_impact(&route, &config).cost_per_bus_per_year, 0.0);
    }

    #[test]
    fn test_driver_report_needs_improvement() {
        let config = Config::default();
        let critical = savings_with(Some(Priority::Critical), 1.08, 1.62);
        let trips = vec![&critical; 6];

        let report = driver_report("D007", &trips, &config);

        assert_eq!(report.driver_id, "D007");
        assert_eq!(report.performance_level, PerformanceLevel::NeedsImprovement);
        assert_eq!(report.critical_trips, 6);
        assert_eq!(report.weekly_savings_potential, 9.72);
        assert_eq!(report.annual_savings_potential, 505.44);
        assert_eq!(
            report.feedback,
            "6 trips with critical waste (Heavy load + Aggressive acceleration)"
        );
    }

    #[test]
    fn test_driver_report_levels() {
        let config = Config::default();
        let big = savings_with(Some(Priority::Medium), 6.0, 9.0);
        let mid = savings_with(Some(Priority::Medium), 3.0, 4.5);
        let none = savings_with(None, 0.0, 0.0);

        assert_eq!(
            driver_report("D1", &[&big], &config).performance_level,
            PerformanceLevel::Fair
        );
        assert_eq!(
            driver_report("D1", &[&mid], &config).performance_level,
            PerformanceLevel::Good
        );
        let excellent = driver_report("D1", &[&none], &config);
        assert_eq!(excellent.performance_level, PerformanceLevel::Excellent);
        assert_eq!(excellent.feedback, "Excellent fuel-efficient driving!");
        assert_eq!(excellent.recommended_action, "Maintain current practices");
    }
}
