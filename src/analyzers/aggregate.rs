use crate::analyzers::savings::{driver_report, fleet_savings, project_fleet_wide_impact};
use crate::analyzers::types::{
    DriverReport, FleetSummary, LoadCategory, LoadCategoryStats, TripAnalysis, TripSavings,
};
use crate::analyzers::utility::{mean, pct, round_to};
use crate::config::Config;
use std::collections::BTreeMap;
use tracing::debug;

/// Aggregates processed trips into a [`FleetSummary`].
///
/// Trips are bucketed by their dominant load category; trips with an
/// `UNKNOWN` dominant load count toward `total_trips` only. Fleet savings are
/// computed over the trips that have savings and then projected fleet-wide.
pub fn aggregate_fleet(trips: &[TripAnalysis], config: &Config) -> FleetSummary {
    let total_trips = trips.len();

    let mut by_load: BTreeMap<LoadCategory, Vec<&TripAnalysis>> = BTreeMap::new();
    for trip in trips {
        if let Some(category) = trip.load.dominant_load_category {
            by_load.entry(category).or_default().push(trip);
        }
    }

    let by_load_category = by_load
        .into_iter()
        .map(|(category, group)| {
            let rates: Vec<f64> = group.iter().map(|t| t.fuel.avg_fuel_per_km).collect();
            let total_fuel: f64 = group.iter().map(|t| t.fuel.total_fuel_liters).sum();
            let stats = LoadCategoryStats {
                count: group.len(),
                percentage: round_to(pct(group.len() as f64, total_trips as f64), 1),
                avg_fuel_per_km: round_to(mean(&rates), 3),
                total_fuel: round_to(total_fuel, 1),
            };
            (category, stats)
        })
        .collect();

    let with_savings: Vec<&TripSavings> = trips
        .iter()
        .map(|t| &t.savings)
        .filter(|s| s.has_savings)
        .collect();
    debug!(
        total_trips,
        trips_with_savings = with_savings.len(),
        "Aggregating fleet savings"
    );

    let fleet = fleet_savings(&with_savings, config);
    let projection = project_fleet_wide_impact(&fleet, config);

    FleetSummary {
        route: config.report.route.clone(),
        period: config.report.period.clone(),
        total_trips,
        by_load_category,
        fleet_savings: fleet,
        sbs_fleet_projection: projection,
    }
}

/// One report per driver, ordered by driver id.
pub fn driver_reports(trips: &[TripAnalysis], config: &Config) -> Vec<DriverReport> {
    let mut by_driver: BTreeMap<&str, Vec<&TripSavings>> = BTreeMap::new();
    for trip in trips {
        by_driver
            .entry(trip.driver_id.as_str())
            .or_default()
            .push(&trip.savings);
    }

    by_driver
        .into_iter()
        .map(|(driver_id, savings)| driver_report(driver_id, &savings, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::analyzer::process_trip;
    use crate::analyzers::types::{PerformanceLevel, Priority};
    use crate::model::fixtures::trip;

    fn analysis(driver: &str, load: Option<LoadCategory>, fuel_rate: f64) -> TripAnalysis {
        let mut analysis = process_trip(&trip(&[10, 10], vec![]), &Config::default()).unwrap();
        analysis.driver_id = driver.to_string();
        analysis.load.dominant_load_category = load;
        analysis.fuel.avg_fuel_per_km = fuel_rate;
        analysis.fuel.total_fuel_liters = fuel_rate * 10.0;
        analysis
    }

    fn with_savings(mut analysis: TripAnalysis, fuel: f64, priority: Priority) -> TripAnalysis {
        analysis.savings = TripSavings {
            trip_id: analysis.trip_id.clone(),
            has_savings: true,
            total_wasted_fuel: fuel,
            total_wasted_cost: fuel * 1.5,
            priority: Some(priority),
            heavy_aggressive_segments: usize::from(priority == Priority::Critical),
            ..Default::default()
        };
        analysis
    }

    #[test]
    fn test_aggregate_empty() {
        let summary = aggregate_fleet(&[], &Config::default());

        assert_eq!(summary.total_trips, 0);
        assert!(summary.by_load_category.is_empty());
        assert_eq!(summary.fleet_savings.total_trips, 0);
        assert_eq!(summary.sbs_fleet_projection.projected_annual_cost_waste, 0.0);
        assert_eq!(summary.route, "12");
    }

    #[test]
    fn test_by_load_category() {
        let trips = vec![
            analysis("D001", Some(LoadCategory::Light), 0.8),
            analysis("D001", Some(LoadCategory::Light), 0.82),
            analysis("D002", Some(LoadCategory::Heavy), 1.1),
            analysis("D002", None, 0.0),
        ];

        let summary = aggregate_fleet(&trips, &Config::default());

        assert_eq!(summary.total_trips, 4);
        assert_eq!(summary.by_load_category.len(), 2);
        let light = &summary.by_load_category[&LoadCategory::Light];
        assert_eq!(light.count, 2);
        assert_eq!(light.percentage, 50.0);
        assert_eq!(light.avg_fuel_per_km, 0.81);
        assert_eq!(light.total_fuel, 16.2);
        assert_eq!(summary.by_load_category[&LoadCategory::Heavy].percentage, 25.0);
        assert!(!summary.by_load_category.contains_key(&LoadCategory::Medium));
    }

    #[test]
    fn test_fleet_savings_only_over_wasteful_trips() {
        let trips = vec![
            with_savings(
                analysis("D007", Some(LoadCategory::Heavy), 1.1),
                2.0,
                Priority::Critical,
            ),
            analysis("D001", Some(LoadCategory::Light), 0.8),
        ];

        let summary = aggregate_fleet(&trips, &Config::default());

        assert_eq!(summary.total_trips, 2);
        assert_eq!(summary.fleet_savings.total_trips, 1);
        assert_eq!(summary.fleet_savings.waste_percentage, 100.0);
        assert_eq!(summary.fleet_savings.critical_trips, 1);
        assert_eq!(summary.fleet_savings.annual_fuel_waste, 104.0);
    }

    #[test]
    fn test_driver_reports_grouped_and_sorted() {
        let trips = vec![
            with_savings(
                analysis("D007", Some(LoadCategory::Heavy), 1.1),
                1.0,
                Priority::Critical,
            ),
            analysis("D001", Some(LoadCategory::Light), 0.8),
            analysis("D001", Some(LoadCategory::Light), 0.8),
        ];

        let reports = driver_reports(&trips, &Config::default());

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].driver_id, "D001");
        assert_eq!(reports[0].total_trips, 2);
        assert_eq!(reports[0].performance_level, PerformanceLevel::Excellent);
        assert_eq!(reports[1].driver_id, "D007");
        assert_eq!(reports[1].performance_level, PerformanceLevel::NeedsImprovement);
    }
}
