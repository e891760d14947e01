//! Raw trip records as produced by the data source.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TripError;

/// Boarding/alighting activity at one stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_name: Option<String>,
    #[serde(default)]
    pub boarding: i64,
    #[serde(default)]
    pub alighting: i64,
    pub total_onboard: i64,
}

/// One GPS speed reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedSample {
    /// Seconds. Restarts at 0 on every segment in generated data.
    pub timestamp: i64,
    #[serde(alias = "speed")]
    pub speed_kmh: f64,
    #[serde(default)]
    pub segment: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passenger_load: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: String,
    pub bus_id: String,
    pub driver_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default)]
    pub is_peak: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_distance_km: Option<f64>,
    #[serde(default)]
    pub passenger_events: Vec<PassengerEvent>,
    #[serde(default)]
    pub speed_data: Vec<SpeedSample>,
}

impl Trip {
    /// Rejects records the analyzers cannot make sense of.
    ///
    /// Empty passenger or speed data is not an error here; the analyzers
    /// report those trips as `UNKNOWN`.
    pub fn validate(&self) -> Result<(), TripError> {
        for (stop, event) in self.passenger_events.iter().enumerate() {
            if event.boarding < 0 {
                return Err(TripError::NegativeFlow {
                    stop,
                    field: "boarding",
                    value: event.boarding,
                });
            }
            if event.alighting < 0 {
                return Err(TripError::NegativeFlow {
                    stop,
                    field: "alighting",
                    value: event.alighting,
                });
            }
            if event.total_onboard < 0 {
                return Err(TripError::NegativeFlow {
                    stop,
                    field: "total_onboard",
                    value: event.total_onboard,
                });
            }
        }

        for (index, sample) in self.speed_data.iter().enumerate() {
            if sample.timestamp < 0 {
                return Err(TripError::MalformedTimestamp {
                    index,
                    timestamp: sample.timestamp,
                });
            }
            if !sample.speed_kmh.is_finite() || sample.speed_kmh < 0.0 {
                return Err(TripError::InvalidSpeed {
                    index,
                    speed: sample.speed_kmh,
                });
            }
        }

        if let Some(distance) = self.total_distance_km {
            if !distance.is_finite() || distance < 0.0 {
                return Err(TripError::InvalidDistance(distance));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn event(total_onboard: i64) -> PassengerEvent {
        PassengerEvent {
            stop_id: None,
            stop_name: None,
            boarding: 0,
            alighting: 0,
            total_onboard,
        }
    }

    pub fn sample(timestamp: i64, speed_kmh: f64, segment: usize) -> SpeedSample {
        SpeedSample {
            timestamp,
            speed_kmh,
            segment,
            passenger_load: None,
        }
    }

    pub fn trip(passengers: &[i64], speed_data: Vec<SpeedSample>) -> Trip {
        Trip {
            trip_id: "T001".into(),
            bus_id: "SBS1235K".into(),
            driver_id: "D001".into(),
            route: Some("12".into()),
            date: NaiveDate::from_ymd_opt(2024, 12, 16).unwrap(),
            start_time: None,
            is_peak: true,
            total_distance_km: Some(15.2),
            passenger_events: passengers.iter().map(|&p| event(p)).collect(),
            speed_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_deserialize_minimal_record() {
        let json = r#"{
            "trip_id": "T1",
            "bus_id": "B1",
            "driver_id": "D1",
            "date": "2024-12-16",
            "passenger_events": [{"total_onboard": 5}],
            "speed_data": [{"timestamp": 0, "speed": 12.5}]
        }"#;
        let trip: Trip = serde_json::from_str(json).unwrap();

        assert_eq!(trip.trip_id, "T1");
        assert!(!trip.is_peak);
        assert_eq!(trip.total_distance_km, None);
        assert_eq!(trip.speed_data[0].speed_kmh, 12.5);
        assert_eq!(trip.speed_data[0].segment, 0);
        assert!(trip.validate().is_ok());
    }

    #[test]
    fn test_malformed_date_is_rejected_by_serde() {
        let json = r#"{"trip_id": "T1", "bus_id": "B1", "driver_id": "D1", "date": "16/12/2024"}"#;
        assert!(serde_json::from_str::<Trip>(json).is_err());
    }

    #[test]
    fn test_validate_negative_onboard() {
        let t = trip(&[10, -1], vec![]);
        assert_eq!(
            t.validate(),
            Err(TripError::NegativeFlow {
                stop: 1,
                field: "total_onboard",
                value: -1
            })
        );
    }

    #[test]
    fn test_validate_negative_timestamp() {
        let t = trip(&[10], vec![sample(0, 0.0, 0), sample(-5, 10.0, 0)]);
        assert_eq!(
            t.validate(),
            Err(TripError::MalformedTimestamp {
                index: 1,
                timestamp: -5
            })
        );
    }

    #[test]
    fn test_validate_negative_speed() {
        let t = trip(&[10], vec![sample(0, -3.0, 0)]);
        assert!(matches!(t.validate(), Err(TripError::InvalidSpeed { index: 0, .. })));
    }

    #[test]
    fn test_validate_accepts_empty_data() {
        assert!(trip(&[], vec![]).validate().is_ok());
    }
}
