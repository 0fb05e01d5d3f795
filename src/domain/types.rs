//! Shared types for detection analysis

use crate::error::AnalysisError;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Newtype wrapper for tagged-animal IDs to provide type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimalId(pub String);

impl std::fmt::Display for AnimalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AnimalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Newtype wrapper for receiver (station) labels
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub String);

impl std::fmt::Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Surrogate key for a physical receiver location (label + coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct LocationId(pub u32);

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One detection of a tagged animal by a receiver, projected to canonical roles
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub animal_id: AnimalId,
    pub station_id: StationId,
    pub timestamp: NaiveDateTime,
    pub date: NaiveDate,
    pub lat: f64,
    pub long: f64,
    /// Columns outside the mapped roles, carried through untouched
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Detection {
    /// Build a detection whose calendar day is taken from the timestamp
    pub fn new(
        animal_id: impl Into<AnimalId>,
        station_id: impl Into<StationId>,
        timestamp: NaiveDateTime,
        lat: f64,
        long: f64,
    ) -> Self {
        Self {
            animal_id: animal_id.into(),
            station_id: station_id.into(),
            timestamp,
            date: timestamp.date(),
            lat,
            long,
            metadata: serde_json::Map::new(),
        }
    }
}

/// Unit in which residency durations are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Seconds,
    Minutes,
    #[default]
    Hours,
    Days,
    Weeks,
}

impl DurationUnit {
    pub const ALL: [DurationUnit; 5] = [
        DurationUnit::Seconds,
        DurationUnit::Minutes,
        DurationUnit::Hours,
        DurationUnit::Days,
        DurationUnit::Weeks,
    ];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Seconds => "seconds",
            DurationUnit::Minutes => "minutes",
            DurationUnit::Hours => "hours",
            DurationUnit::Days => "days",
            DurationUnit::Weeks => "weeks",
        }
    }

    /// Length of one unit in seconds
    #[inline]
    pub fn seconds(&self) -> f64 {
        match self {
            DurationUnit::Seconds => 1.0,
            DurationUnit::Minutes => 60.0,
            DurationUnit::Hours => 3_600.0,
            DurationUnit::Days => 86_400.0,
            DurationUnit::Weeks => 604_800.0,
        }
    }

    /// Express a time span in this unit
    pub fn convert(&self, span: TimeDelta) -> f64 {
        let secs = match span.num_microseconds() {
            Some(us) => us as f64 / 1_000_000.0,
            None => span.num_milliseconds() as f64 / 1_000.0,
        };
        secs / self.seconds()
    }
}

impl std::fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DurationUnit {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        DurationUnit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == normalized)
            .ok_or_else(|| {
                let expected: Vec<&str> = DurationUnit::ALL.iter().map(|u| u.as_str()).collect();
                AnalysisError::config("unit", s, &expected.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_unit_from_str() {
        assert_eq!("hours".parse::<DurationUnit>().unwrap(), DurationUnit::Hours);
        assert_eq!("Minutes".parse::<DurationUnit>().unwrap(), DurationUnit::Minutes);
        assert_eq!(" weeks ".parse::<DurationUnit>().unwrap(), DurationUnit::Weeks);
    }

    #[test]
    fn test_duration_unit_rejects_unknown() {
        let err = "fortnights".parse::<DurationUnit>().unwrap_err();
        assert!(matches!(err, AnalysisError::Config { .. }));
        let msg = err.to_string();
        assert!(msg.contains("fortnights"));
        assert!(msg.contains("seconds, minutes, hours, days, weeks"));
    }

    #[test]
    fn test_duration_unit_convert() {
        let span = TimeDelta::minutes(90);
        assert_eq!(DurationUnit::Seconds.convert(span), 5400.0);
        assert_eq!(DurationUnit::Minutes.convert(span), 90.0);
        assert_eq!(DurationUnit::Hours.convert(span), 1.5);
        assert_eq!(DurationUnit::Days.convert(TimeDelta::hours(36)), 1.5);
        assert_eq!(DurationUnit::Weeks.convert(TimeDelta::days(14)), 2.0);
    }

    #[test]
    fn test_detection_new_derives_date() {
        let ts = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(23, 59, 0).unwrap();
        let d = Detection::new("A1", "R1", ts, 45.0, -83.0);
        assert_eq!(d.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(d.animal_id, AnimalId("A1".to_string()));
        assert!(d.metadata.is_empty());
    }
}
