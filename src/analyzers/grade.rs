use crate::analyzers::types::PerformanceLevel;
use crate::config::Config;

/// Rates a driver from their weekly waste.
///
/// | Condition                        | Level             |
/// |----------------------------------|-------------------|
/// | any CRITICAL trip                | NEEDS IMPROVEMENT |
/// | waste > fair_waste_liters (5 L)  | FAIR              |
/// | waste > good_waste_liters (2 L)  | GOOD              |
/// | otherwise                        | EXCELLENT         |
pub fn performance_level(
    total_waste_liters: f64,
    critical_trips: usize,
    config: &Config,
) -> PerformanceLevel {
    let thresholds = &config.savings;
    match total_waste_liters {
        _ if critical_trips > 0 => PerformanceLevel::NeedsImprovement,
        w if w > thresholds.fair_waste_liters => PerformanceLevel::Fair,
        w if w > thresholds.good_waste_liters => PerformanceLevel::Good,
        _ => PerformanceLevel::Excellent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_performance_boundaries() {
        let config = Config::default();
        assert_eq!(performance_level(0.0, 1, &config), PerformanceLevel::NeedsImprovement);
        assert_eq!(performance_level(9.0, 0, &config), PerformanceLevel::Fair);
        assert_eq!(performance_level(5.01, 0, &config), PerformanceLevel::Fair);
        assert_eq!(performance_level(5.0, 0, &config), PerformanceLevel::Good);
        assert_eq!(performance_level(2.01, 0, &config), PerformanceLevel::Good);
        assert_eq!(performance_level(2.0, 0, &config), PerformanceLevel::Excellent);
        assert_eq!(performance_level(0.0, 0, &config), PerformanceLevel::Excellent);
    }
}
