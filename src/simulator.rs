//! Synthetic Route 12 trip data.
//!
//! Generates a reproducible week of trips from a seed: ten buses, five
//! weekdays, six departures a day. Passenger flows depend on the stop and on
//! whether the departure falls in a peak window. Each driver has a fixed
//! behaviour profile that decides how hard they pull away from every stop.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;
use std::ops::RangeInclusive;

use crate::analyzers::load::category_for;
use crate::analyzers::types::{AccelCategory, LoadCategory};
use crate::config::Config;
use crate::model::{PassengerEvent, SpeedSample, Trip};

pub const ROUTE: &str = "12";
pub const ROUTE_LENGTH_KM: f64 = 15.2;
pub const BUS_CAPACITY: i64 = 84;
pub const NUM_BUSES: usize = 10;
pub const NUM_DAYS: i64 = 5;
pub const TRIP_HOURS: [u32; 6] = [6, 9, 12, 15, 18, 21];

const SAMPLE_INTERVAL_SECS: i64 = 5;
const DECEL_STEPS: i64 = 4;
const CRUISE_SHARE: f64 = 0.6;

pub struct Stop {
    pub id: &'static str,
    pub name: &'static str,
    pub position_km: f64,
}

pub static ROUTE_12_STOPS: [Stop; 10] = [
    Stop { id: "S001", name: "Tampines Interchange", position_km: 0.0 },
    Stop { id: "S002", name: "Tampines Ave 4", position_km: 1.2 },
    Stop { id: "S003", name: "Simei MRT", position_km: 2.8 },
    Stop { id: "S004", name: "Bedok North", position_km: 4.5 },
    Stop { id: "S005", name: "Bedok Reservoir", position_km: 6.2 },
    Stop { id: "S006", name: "Bedok Interchange", position_km: 8.0 },
    Stop { id: "S007", name: "Bedok South", position_km: 9.5 },
    Stop { id: "S008", name: "Tanah Merah", position_km: 11.2 },
    Stop { id: "S009", name: "Siglap", position_km: 13.0 },
    Stop { id: "S010", name: "Marine Parade", position_km: 15.2 },
];

/// How a driver habitually accelerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverBehavior {
    Gentle,
    Moderate,
    Aggressive,
}

impl DriverBehavior {
    pub fn for_driver(driver_id: &str) -> Self {
        match driver_id {
            "D001" | "D002" | "D010" => DriverBehavior::Gentle,
            "D007" | "D008" => DriverBehavior::Aggressive,
            _ => DriverBehavior::Moderate,
        }
    }
}

/// Speed ramp used when pulling away from a stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedProfile {
    pub ramp_secs: i64,
    pub max_speed_kmh: f64,
}

impl SpeedProfile {
    pub fn for_style(style: AccelCategory) -> Self {
        match style {
            AccelCategory::Gentle => SpeedProfile { ramp_secs: 25, max_speed_kmh: 45.0 },
            AccelCategory::Moderate => SpeedProfile { ramp_secs: 15, max_speed_kmh: 50.0 },
            AccelCategory::Aggressive => SpeedProfile { ramp_secs: 10, max_speed_kmh: 55.0 },
        }
    }
}

pub fn is_peak_hour(hour: u32) -> bool {
    (7..=9).contains(&hour) || (17..=19).contains(&hour)
}

/// Boarding and alighting ranges for a stop.
fn passenger_flow_ranges(
    stop_index: usize,
    is_peak: bool,
) -> (RangeInclusive<i64>, RangeInclusive<i64>) {
    if !is_peak {
        return (2..=10, 2..=8);
    }
    match stop_index {
        0..=2 => (15..=35, 0..=5),
        5 => (20..=40, 10..=25),
        i if i >= 8 => (5..=15, 15..=30),
        _ => (8..=20, 5..=15),
    }
}

/// Acceleration style for one segment given the load leaving the stop.
pub fn acceleration_style<R: Rng>(
    passenger_load: i64,
    behavior: DriverBehavior,
    rng: &mut R,
) -> AccelCategory {
    match behavior {
        DriverBehavior::Gentle => AccelCategory::Gentle,
        DriverBehavior::Aggressive => {
            if passenger_load > 60 && rng.r#gen::<f64>() > 0.6 {
                AccelCategory::Aggressive
            } else {
                AccelCategory::Moderate
            }
        }
        DriverBehavior::Moderate => {
            if passenger_load > 60 && rng.r#gen::<f64>() > 0.7 {
                AccelCategory::Gentle
            } else {
                AccelCategory::Moderate
            }
        }
    }
}

/// Speed samples for one segment, as `(timestamp, speed_kmh)` pairs.
///
/// Timestamps start at 0 for every segment. The bus ramps up in 5 s steps,
/// cruises at top speed over 60 % of the segment, then brakes in four steps
/// to a final stop.
pub fn speed_profile(profile: SpeedProfile, segment_distance_km: f64) -> Vec<(i64, f64)> {
    let SpeedProfile {
        ramp_secs,
        max_speed_kmh,
    } = profile;
    let mut samples = vec![(0, 0.0)];
    let mut t = 0;

    let ramp_steps = (ramp_secs / SAMPLE_INTERVAL_SECS).max(1);
    for i in 1..=ramp_steps {
        t += SAMPLE_INTERVAL_SECS;
        let speed = max_speed_kmh / ramp_steps as f64 * i as f64;
        samples.push((t, (speed * 10.0).round() / 10.0));
    }

    let cruise_secs = segment_distance_km * CRUISE_SHARE / max_speed_kmh * 3600.0;
    let cruise_steps = (cruise_secs / SAMPLE_INTERVAL_SECS as f64).floor() as i64;
    for _ in 0..cruise_steps {
        t += SAMPLE_INTERVAL_SECS;
        samples.push((t, max_speed_kmh));
    }

    for i in (1..=DECEL_STEPS).rev() {
        t += SAMPLE_INTERVAL_SECS;
        let speed = max_speed_kmh / DECEL_STEPS as f64 * i as f64;
        samples.push((t, (speed * 10.0).round() / 10.0));
    }

    t += SAMPLE_INTERVAL_SECS;
    samples.push((t, 0.0));
    samples
}

fn segment_samples(
    profile: SpeedProfile,
    segment: usize,
    passenger_load: i64,
) -> impl Iterator<Item = SpeedSample> {
    let distance = ROUTE_12_STOPS[segment + 1].position_km - ROUTE_12_STOPS[segment].position_km;
    speed_profile(profile, distance)
        .into_iter()
        .map(move |(timestamp, speed_kmh)| SpeedSample {
            timestamp,
            speed_kmh,
            segment,
            passenger_load: Some(passenger_load),
        })
}

fn trip_id(date: NaiveDate, bus_id: &str, trip_num: usize) -> String {
    let suffix = &bus_id[bus_id.len().saturating_sub(3)..];
    format!("T{}{}{:02}", date.format("%Y%m%d"), suffix, trip_num)
}

/// Generates one trip along Route 12.
pub fn generate_trip<R: Rng>(
    bus_id: &str,
    driver_id: &str,
    trip_num: usize,
    date: NaiveDate,
    start_hour: u32,
    rng: &mut R,
) -> Trip {
    let is_peak = is_peak_hour(start_hour);
    let behavior = DriverBehavior::for_driver(driver_id);

    let mut passenger_events = Vec::with_capacity(ROUTE_12_STOPS.len());
    let mut speed_data = Vec::new();
    let mut onboard: i64 = 0;

    for (i, stop) in ROUTE_12_STOPS.iter().enumerate() {
        let (boarding_range, alighting_range) = passenger_flow_ranges(i, is_peak);
        let boarding = rng.gen_range(boarding_range);
        let alighting = if i == 0 {
            0
        } else {
            rng.gen_range(alighting_range).min(onboard)
        };

        onboard = (onboard + boarding - alighting).clamp(0, BUS_CAPACITY);

        passenger_events.push(PassengerEvent {
            stop_id: Some(stop.id.to_string()),
            stop_name: Some(stop.name.to_string()),
            boarding,
            alighting,
            total_onboard: onboard,
        });

        if i + 1 < ROUTE_12_STOPS.len() {
            let style = acceleration_style(onboard, behavior, rng);
            speed_data.extend(segment_samples(SpeedProfile::for_style(style), i, onboard));
        }
    }

    Trip {
        trip_id: trip_id(date, bus_id, trip_num),
        bus_id: bus_id.to_string(),
        driver_id: driver_id.to_string(),
        route: Some(ROUTE.to_string()),
        date,
        start_time: Some(format!("{start_hour:02}:00:00")),
        is_peak,
        total_distance_km: Some(ROUTE_LENGTH_KM),
        passenger_events,
        speed_data,
    }
}

pub fn week_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 16).unwrap_or_default()
}

/// A Monday-to-Friday week of trips for every bus, reproducible from `seed`.
pub fn generate_week(seed: u64) -> Vec<Trip> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = week_start();

    let mut trips = Vec::with_capacity(NUM_BUSES * NUM_DAYS as usize * TRIP_HOURS.len());
    for day in 0..NUM_DAYS {
        let date = start + Duration::days(day);
        for bus_num in 1..=NUM_BUSES {
            let bus_id = format!("SBS{}K", 1234 + bus_num);
            let driver_id = format!("D{bus_num:03}");
            for (trip_index, &hour) in TRIP_HOURS.iter().enumerate() {
                trips.push(generate_trip(
                    &bus_id,
                    &driver_id,
                    trip_index + 1,
                    date,
                    hour,
                    &mut rng,
                ));
            }
        }
    }
    trips
}

/// Headline counts for a generated data set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub total_trips: usize,
    pub peak_trips: usize,
    pub off_peak_trips: usize,
    pub light_load_trips: usize,
    pub medium_load_trips: usize,
    pub heavy_load_trips: usize,
    pub route: String,
    pub period: String,
}

/// Counts trips by peak window and by their busiest moment.
pub fn summarize(trips: &[Trip], config: &Config) -> SimulationSummary {
    let peak_trips = trips.iter().filter(|t| t.is_peak).count();
    let (mut light, mut medium, mut heavy) = (0, 0, 0);
    for trip in trips {
        let max_load = trip
            .passenger_events
            .iter()
            .map(|e| e.total_onboard)
            .max()
            .unwrap_or(0);
        match category_for(max_load, config) {
            LoadCategory::Light => light += 1,
            LoadCategory::Medium => medium += 1,
            LoadCategory::Heavy => heavy += 1,
        }
    }

    SimulationSummary {
        total_trips: trips.len(),
        peak_trips,
        off_peak_trips: trips.len() - peak_trips,
        light_load_trips: light,
        medium_load_trips: medium,
        heavy_load_trips: heavy,
        route: ROUTE.to_string(),
        period: config.report.period.clone(),
    }
}

/// A peak-hour trip with a heavy load and a driver who pulls away hard.
///
/// The generated profiles ramp in 5 s steps and never cross the aggressive
/// threshold, so this trip uses single-step ramps instead.
pub fn wasteful_demo_trip() -> Trip {
    const LOADS: [i64; 10] = [45, 58, 72, 70, 68, 65, 63, 61, 48, 30];
    const STYLES: [AccelCategory; 9] = [
        AccelCategory::Moderate,
        AccelCategory::Aggressive,
        AccelCategory::Aggressive,
        AccelCategory::Aggressive,
        AccelCategory::Aggressive,
        AccelCategory::Aggressive,
        AccelCategory::Aggressive,
        AccelCategory::Moderate,
        AccelCategory::Moderate,
    ];

    let mut previous = 0;
    let passenger_events = ROUTE_12_STOPS
        .iter()
        .zip(LOADS)
        .map(|(stop, load)| {
            let delta = load - previous;
            previous = load;
            PassengerEvent {
                stop_id: Some(stop.id.to_string()),
                stop_name: Some(stop.name.to_string()),
                boarding: delta.max(0),
                alighting: (-delta).max(0),
                total_onboard: load,
            }
        })
        .collect();

    let speed_data = STYLES
        .iter()
        .enumerate()
        .flat_map(|(segment, style)| {
            let profile = match style {
                AccelCategory::Aggressive => SpeedProfile { ramp_secs: 5, max_speed_kmh: 50.0 },
                _ => SpeedProfile { ramp_secs: 5, max_speed_kmh: 36.0 },
            };
            segment_samples(profile, segment, LOADS[segment])
        })
        .collect();

    Trip {
        trip_id: "DEMO_HEAVY_WASTEFUL".to_string(),
        bus_id: "SBS1238K".to_string(),
        driver_id: "D007".to_string(),
        route: Some(ROUTE.to_string()),
        date: week_start(),
        start_time: Some("08:00:00".to_string()),
        is_peak: true,
        total_distance_km: Some(ROUTE_LENGTH_KM),
        passenger_events,
        speed_data,
    }
}
