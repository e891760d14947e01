//! Acceleration detection from GPS speed samples.
//!
//! Accelerations are derived from consecutive sample pairs. Only speeding up
//! is of interest: braking and changes at or below the noise floor never
//! produce an event.

use crate::analyzers::types::{
    AccelCategory, AccelerationAnalysis, AccelerationEvent, SegmentAcceleration,
};
use crate::analyzers::utility::{mean, pct, round_to};
use crate::config::Config;
use crate::model::{SpeedSample, Trip};

const KMH_PER_MS: f64 = 3.6;

/// Acceleration in m/s² between two speeds in km/h. Zero when `dt_secs` is zero.
pub fn acceleration(speed_start_kmh: f64, speed_end_kmh: f64, dt_secs: f64) -> f64 {
    if dt_secs == 0.0 {
        return 0.0;
    }
    (speed_end_kmh - speed_start_kmh) / KMH_PER_MS / dt_secs
}

/// | Acceleration (m/s²)        | Category   |
/// |----------------------------|------------|
/// | < gentle_below             | GENTLE     |
/// | < moderate_below           | MODERATE   |
/// | >= moderate_below          | AGGRESSIVE |
pub fn classify(accel_ms2: f64, config: &Config) -> AccelCategory {
    match accel_ms2 {
        a if a < config.acceleration.gentle_below => AccelCategory::Gentle,
        a if a < config.acceleration.moderate_below => AccelCategory::Moderate,
        _ => AccelCategory::Aggressive,
    }
}

/// Lazily yields acceleration events from consecutive sample pairs.
///
/// Pairs whose timestamps do not move forward are skipped.
pub fn events<'a>(
    samples: &'a [SpeedSample],
    config: &'a Config,
) -> impl Iterator<Item = AccelerationEvent> + 'a {
    samples.windows(2).filter_map(move |pair| {
        let (current, next) = (&pair[0], &pair[1]);
        let dt = next.timestamp - current.timestamp;
        if dt <= 0 {
            return None;
        }

        let accel = acceleration(current.speed_kmh, next.speed_kmh, dt as f64);
        if accel <= config.acceleration.noise_floor {
            return None;
        }

        Some(AccelerationEvent {
            start_time: current.timestamp,
            end_time: next.timestamp,
            start_speed_kmh: current.speed_kmh,
            end_speed_kmh: next.speed_kmh,
            acceleration_ms2: round_to(accel, 2),
            category: classify(accel, config),
            segment: current.segment,
        })
    })
}

pub fn detect_events(samples: &[SpeedSample], config: &Config) -> Vec<AccelerationEvent> {
    events(samples, config).collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct EventStats {
    avg: f64,
    max: f64,
    gentle: usize,
    moderate: usize,
    aggressive: usize,
}

impl EventStats {
    fn from_events(events: &[AccelerationEvent]) -> Self {
        let values: Vec<f64> = events.iter().map(|e| e.acceleration_ms2).collect();
        let count = |c: AccelCategory| events.iter().filter(|e| e.category == c).count();

        EventStats {
            avg: round_to(mean(&values), 2),
            max: round_to(values.iter().copied().fold(0.0, f64::max), 2),
            gentle: count(AccelCategory::Gentle),
            moderate: count(AccelCategory::Moderate),
            aggressive: count(AccelCategory::Aggressive),
        }
    }
}

/// Acceleration pattern for the samples belonging to one segment.
///
/// The segment is AGGRESSIVE as soon as a single aggressive event occurs.
pub fn segment_analysis(
    samples: &[SpeedSample],
    segment_id: usize,
    config: &Config,
) -> SegmentAcceleration {
    let segment_samples: Vec<SpeedSample> = samples
        .iter()
        .filter(|s| s.segment == segment_id)
        .cloned()
        .collect();

    if segment_samples.len() < 2 {
        return SegmentAcceleration {
            segment_id,
            category: None,
            ..Default::default()
        };
    }

    let events = detect_events(&segment_samples, config);
    if events.is_empty() {
        return SegmentAcceleration {
            segment_id,
            category: Some(AccelCategory::Gentle),
            ..Default::default()
        };
    }

    let stats = EventStats::from_events(&events);
    let dominant = if stats.aggressive > 0 {
        AccelCategory::Aggressive
    } else if stats.moderate > stats.gentle {
        AccelCategory::Moderate
    } else {
        AccelCategory::Gentle
    };

    SegmentAcceleration {
        segment_id,
        category: Some(dominant),
        avg_acceleration: stats.avg,
        max_acceleration: stats.max,
        total_events: events.len(),
        gentle_count: stats.gentle,
        moderate_count: stats.moderate,
        aggressive_count: stats.aggressive,
        acceleration_events: events,
    }
}

/// Acceleration analysis for a whole trip.
///
/// Unlike [`segment_analysis`], the trip pattern is decided by shares of the
/// flat event list: AGGRESSIVE above 30 % aggressive events, else MODERATE
/// above 50 % moderate events, else GENTLE.
pub fn analyze_trip_acceleration(trip: &Trip, config: &Config) -> AccelerationAnalysis {
    let speed_data = &trip.speed_data;

    if speed_data.len() < 2 {
        return AccelerationAnalysis {
            trip_id: trip.trip_id.clone(),
            dominant_pattern: None,
            error: Some("No speed data available".into()),
            ..Default::default()
        };
    }

    // A trip with no events carries no segment breakdown.
    let all_events = detect_events(speed_data, config);
    if all_events.is_empty() {
        return AccelerationAnalysis {
            trip_id: trip.trip_id.clone(),
            dominant_pattern: Some(AccelCategory::Gentle),
            ..Default::default()
        };
    }

    let num_segments = trip.passenger_events.len().saturating_sub(1);
    let segments: Vec<SegmentAcceleration> = (0..num_segments)
        .map(|seg_id| segment_analysis(speed_data, seg_id, config))
        .collect();

    let stats = EventStats::from_events(&all_events);
    let total = all_events.len() as f64;
    let gentle_pct = pct(stats.gentle as f64, total);
    let moderate_pct = pct(stats.moderate as f64, total);
    let aggressive_pct = pct(stats.aggressive as f64, total);

    let dominant = if aggressive_pct > 30.0 {
        AccelCategory::Aggressive
    } else if moderate_pct > 50.0 {
        AccelCategory::Moderate
    } else {
        AccelCategory::Gentle
    };

    AccelerationAnalysis {
        trip_id: trip.trip_id.clone(),
        dominant_pattern: Some(dominant),
        avg_acceleration: stats.avg,
        max_acceleration: stats.max,
        total_events: all_events.len(),
        gentle_count: stats.gentle,
        gentle_percentage: round_to(gentle_pct, 1),
        moderate_count: stats.moderate,
        moderate_percentage: round_to(moderate_pct, 1),
        aggressive_count: stats.aggressive,
        aggressive_percentage: round_to(aggressive_pct, 1),
        segments,
        error: None,
    }
}

/// One-line description of a trip's acceleration pattern.
pub fn summary(analysis: &AccelerationAnalysis) -> String {
    match analysis.dominant_pattern {
        Some(AccelCategory::Aggressive) => format!(
            "Aggressive driving detected (avg {} m/s², {}% aggressive events)",
            analysis.avg_acceleration, analysis.aggressive_percentage
        ),
        Some(AccelCategory::Moderate) => format!(
            "Moderate acceleration pattern (avg {} m/s²)",
            analysis.avg_acceleration
        ),
        Some(AccelCategory::Gentle) => format!(
            "Gentle acceleration pattern (avg {} m/s²)",
            analysis.avg_acceleration
        ),
        None => "No acceleration data".to_string(),
    }
}
