//! Tunable constants for the fuel-waste pipeline.
//!
//! Every threshold, rate and multiplier the analyzers use lives in [`Config`].
//! The defaults reproduce the Route 12 reference tariff; a JSON file only needs
//! to name the values it overrides:
//!
//! ```json
//! {
//!   "fuel": { "cost_per_liter": 1.72 },
//!   "savings": { "num_routes": 90 }
//! }
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer, Serialize};

use crate::analyzers::types::{AccelCategory, LoadCategory};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub vehicle: VehicleConfig,
    pub load: LoadThresholds,
    pub acceleration: AccelThresholds,
    pub fuel: FuelConfig,
    pub savings: SavingsConfig,
    pub report: ReportConfig,
}

impl Config {
    /// Loads a (possibly partial) config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{path}'"))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config '{path}'"))?;
        config
            .validate()
            .with_context(|| format!("invalid config '{path}'"))?;
        Ok(config)
    }

    /// Rejects values that would break the pipeline's arithmetic: inverted
    /// breakpoints, negative rates or costs, and multipliers that would make
    /// a penalised segment cheaper than gentle driving.
    pub fn validate(&self) -> Result<()> {
        if self.load.light_max < 0 || self.load.light_max > self.load.medium_max {
            bail!(
                "load breakpoints must satisfy 0 <= light_max <= medium_max (got {} and {})",
                self.load.light_max,
                self.load.medium_max
            );
        }

        let accel = &self.acceleration;
        if accel.gentle_below < 0.0 || accel.gentle_below > accel.moderate_below {
            bail!(
                "acceleration breakpoints must satisfy 0 <= gentle_below <= moderate_below (got {} and {})",
                accel.gentle_below,
                accel.moderate_below
            );
        }

        let non_negative = [
            ("vehicle.empty_weight_kg", self.vehicle.empty_weight_kg),
            ("vehicle.avg_passenger_weight_kg", self.vehicle.avg_passenger_weight_kg),
            ("acceleration.noise_floor", accel.noise_floor),
            ("fuel.baseline.light", self.fuel.baseline.light),
            ("fuel.baseline.medium", self.fuel.baseline.medium),
            ("fuel.baseline.heavy", self.fuel.baseline.heavy),
            ("fuel.cost_per_liter", self.fuel.cost_per_liter),
            ("fuel.default_distance_km", self.fuel.default_distance_km),
            ("savings.weeks_per_year", self.savings.weeks_per_year),
            ("savings.route_applicability", self.savings.route_applicability),
            ("savings.fair_waste_liters", self.savings.fair_waste_liters),
            ("savings.good_waste_liters", self.savings.good_waste_liters),
        ];
        if let Some((name, value)) = non_negative.iter().find(|(_, v)| *v < 0.0) {
            bail!("{name} must not be negative (got {value})");
        }

        for load in LoadCategory::ALL {
            for accel in AccelCategory::ALL {
                let multiplier = self.fuel.penalties.multiplier(load, Some(accel));
                if multiplier < 1.0 {
                    bail!("penalty multiplier for {load}/{accel} must be at least 1.0 (got {multiplier})");
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub empty_weight_kg: f64,
    pub avg_passenger_weight_kg: f64,
    pub capacity: u32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            empty_weight_kg: 12_000.0,
            avg_passenger_weight_kg: 70.0,
            capacity: 84,
        }
    }
}

/// Passenger-count breakpoints. Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadThresholds {
    pub light_max: i64,
    pub medium_max: i64,
}

impl Default for LoadThresholds {
    fn default() -> Self {
        Self {
            light_max: 30,
            medium_max: 60,
        }
    }
}

/// Acceleration breakpoints in m/s². Both bounds are exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelThresholds {
    pub gentle_below: f64,
    pub moderate_below: f64,
    /// Positive accelerations at or below this are treated as GPS noise.
    pub noise_floor: f64,
}

impl Default for AccelThresholds {
    fn default() -> Self {
        Self {
            gentle_below: 1.5,
            moderate_below: 2.5,
            noise_floor: 0.1,
        }
    }
}

/// Gentle-acceleration fuel consumption per load category, in L/km.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineRates {
    pub light: f64,
    pub medium: f64,
    pub heavy: f64,
}

impl BaselineRates {
    pub fn rate(&self, load: LoadCategory) -> f64 {
        match load {
            LoadCategory::Light => self.light,
            LoadCategory::Medium => self.medium,
            LoadCategory::Heavy => self.heavy,
        }
    }
}

impl Default for BaselineRates {
    fn default() -> Self {
        Self {
            light: 0.80,
            medium: 0.88,
            heavy: 0.98,
        }
    }
}

/// Multipliers applied on top of the baseline for one load category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PenaltyRow {
    pub gentle: f64,
    pub moderate: f64,
    pub aggressive: f64,
}

impl PenaltyRow {
    pub fn multiplier(&self, accel: AccelCategory) -> f64 {
        match accel {
            AccelCategory::Gentle => self.gentle,
            AccelCategory::Moderate => self.moderate,
            AccelCategory::Aggressive => self.aggressive,
        }
    }
}

/// Load × acceleration penalty matrix. Heavy loads amplify the cost of
/// aggressive acceleration.
///
/// Deserializes cell by cell: any multiplier a file leaves out keeps its
/// default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PenaltyTable {
    pub light: PenaltyRow,
    pub medium: PenaltyRow,
    pub heavy: PenaltyRow,
}

impl PenaltyTable {
    /// Returns the multiplier for a pairing. An unknown acceleration pattern
    /// is charged like gentle driving.
    pub fn multiplier(&self, load: LoadCategory, accel: Option<AccelCategory>) -> f64 {
        let Some(accel) = accel else {
            return 1.0;
        };
        let row = match load {
            LoadCategory::Light => &self.light,
            LoadCategory::Medium => &self.medium,
            LoadCategory::Heavy => &self.heavy,
        };
        row.multiplier(accel)
    }
}

impl Default for PenaltyTable {
    fn default() -> Self {
        Self {
            light: PenaltyRow {
                gentle: 1.000,
                moderate: 1.0125,
                aggressive: 1.025,
            },
            medium: PenaltyRow {
                gentle: 1.000,
                moderate: 1.045,
                aggressive: 1.074,
            },
            heavy: PenaltyRow {
                gentle: 1.000,
                moderate: 1.071,
                aggressive: 1.173,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PenaltyRowOverride {
    gentle: Option<f64>,
    moderate: Option<f64>,
    aggressive: Option<f64>,
}

impl PenaltyRowOverride {
    fn apply(self, row: PenaltyRow) -> PenaltyRow {
        PenaltyRow {
            gentle: self.gentle.unwrap_or(row.gentle),
            moderate: self.moderate.unwrap_or(row.moderate),
            aggressive: self.aggressive.unwrap_or(row.aggressive),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PenaltyTableOverride {
    light: PenaltyRowOverride,
    medium: PenaltyRowOverride,
    heavy: PenaltyRowOverride,
}

impl<'de> Deserialize<'de> for PenaltyTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let overrides = PenaltyTableOverride::deserialize(deserializer)?;
        let defaults = PenaltyTable::default();
        Ok(Self {
            light: overrides.light.apply(defaults.light),
            medium: overrides.medium.apply(defaults.medium),
            heavy: overrides.heavy.apply(defaults.heavy),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelConfig {
    pub baseline: BaselineRates,
    pub penalties: PenaltyTable,
    pub cost_per_liter: f64,
    /// Used when a trip record carries no `total_distance_km`.
    pub default_distance_km: f64,
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            baseline: BaselineRates::default(),
            penalties: PenaltyTable::default(),
            cost_per_liter: 1.50,
            default_distance_km: 15.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavingsConfig {
    pub weeks_per_year: f64,
    /// Share of network routes assumed to behave like the analysed route.
    pub route_applicability: f64,
    pub num_routes: u32,
    pub num_buses: u32,
    /// Driver waste (litres per period) above which performance is FAIR.
    pub fair_waste_liters: f64,
    /// Driver waste (litres per period) above which performance is GOOD.
    pub good_waste_liters: f64,
}

impl Default for SavingsConfig {
    fn default() -> Self {
        Self {
            weeks_per_year: 52.0,
            route_applicability: 0.8,
            num_routes: 127,
            num_buses: 3300,
            fair_waste_liters: 5.0,
            good_waste_liters: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub route: String,
    pub period: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            route: "12".into(),
            period: "Week of Dec 16-20, 2024".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"fuel": {"cost_per_liter": 2.0}, "load": {"light_max": 20}}"#)
                .unwrap();

        assert_eq!(config.fuel.cost_per_liter, 2.0);
        assert_eq!(config.fuel.baseline, BaselineRates::default());
        assert_eq!(config.load.light_max, 20);
        assert_eq!(config.load.medium_max, 60);
        assert_eq!(config.savings, SavingsConfig::default());
    }

    #[test]
    fn test_penalty_lookup() {
        let table = PenaltyTable::default();
        assert_eq!(
            table.multiplier(LoadCategory::Heavy, Some(AccelCategory::Aggressive)),
            1.173
        );
        assert_eq!(
            table.multiplier(LoadCategory::Light, Some(AccelCategory::Moderate)),
            1.0125
        );
        assert_eq!(table.multiplier(LoadCategory::Medium, None), 1.0);
    }

    #[test]
    fn test_load_from_file() {
        let path = format!("{}/fuel_rater_test_config.json", env::temp_dir().display());
        fs::write(&path, r#"{"savings": {"num_routes": 10, "num_buses": 200}}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.savings.num_routes, 10);
        assert_eq!(config.savings.num_buses, 200);
        assert_eq!(config.savings.weeks_per_year, 52.0);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file_errors() {
        assert!(Config::load("/definitely/not/here.json").is_err());
    }

    fn parse(json: &str) -> Config {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_single_penalty_override() {
        let config = parse(r#"{"fuel": {"penalties": {"heavy": {"aggressive": 1.2}}}}"#);
        let penalties = &config.fuel.penalties;
        let defaults = PenaltyTable::default();

        assert_eq!(penalties.heavy.aggressive, 1.2);
        assert_eq!(penalties.heavy.moderate, defaults.heavy.moderate);
        assert_eq!(penalties.heavy.gentle, defaults.heavy.gentle);
        assert_eq!(penalties.light, defaults.light);
        assert_eq!(penalties.medium, defaults.medium);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_penalty_below_one() {
        let config = parse(r#"{"fuel": {"penalties": {"heavy": {"aggressive": 0.9}}}}"#);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("penalty multiplier"));
    }

    #[test]
    fn test_rejects_inverted_load_breakpoints() {
        let config = parse(r#"{"load": {"light_max": 70, "medium_max": 60}}"#);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("light_max"));
    }

    #[test]
    fn test_rejects_inverted_accel_breakpoints() {
        let config = parse(r#"{"acceleration": {"gentle_below": 3.0, "moderate_below": 2.5}}"#);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("gentle_below"));
    }

    #[test]
    fn test_rejects_negative_rate() {
        let config = parse(r#"{"fuel": {"baseline": {"medium": -0.5}}}"#);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fuel.baseline.medium"));
    }

    #[test]
    fn test_rejects_negative_cost() {
        let config = parse(r#"{"fuel": {"cost_per_liter": -1.5}}"#);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fuel.cost_per_liter"));
    }

    #[test]
    fn test_rejects_negative_capacity() {
        let result: std::result::Result<Config, serde_json::Error> =
            serde_json::from_str(r#"{"vehicle": {"capacity": -84}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = format!("{}/fuel_rater_bad_config.json", env::temp_dir().display());
        fs::write(&path, r#"{"fuel": {"penalties": {"light": {"moderate": 0.5}}}}"#).unwrap();

        let result = Config::load(&path);
        fs::remove_file(&path).unwrap();

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("penalty multiplier"));
    }
}
