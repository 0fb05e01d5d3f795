//! Derived tables produced by the residency and movement analyses

use crate::domain::columns::ColumnMap;
use crate::domain::types::{AnimalId, LocationId, StationId};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// One uninterrupted stay, built from a run of identical transitions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidencyEvent {
    pub date: NaiveDate,
    pub animal_id: AnimalId,
    /// Station the run departs from (the previous station of each row)
    pub station_id: StationId,
    pub run_id: u32,
    pub detection_count: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration: f64,
}

/// Total residency per (date, animal, station)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidencySummary {
    pub date: NaiveDate,
    pub animal_id: AnimalId,
    pub station_id: StationId,
    pub total_duration: f64,
}

impl ResidencySummary {
    /// Convert to a JSON object keyed by the caller's column names
    pub fn to_json_value(&self, columns: &ColumnMap) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        obj.insert(
            columns.date.clone(),
            serde_json::Value::String(self.date.format("%Y-%m-%d").to_string()),
        );
        obj.insert(columns.animal.clone(), serde_json::Value::String(self.animal_id.0.clone()));
        obj.insert(columns.station.clone(), serde_json::Value::String(self.station_id.0.clone()));
        obj.insert("total_duration".to_string(), serde_json::json!(self.total_duration));
        serde_json::Value::Object(obj)
    }
}

/// A physical receiver position; a redeployed receiver yields a second location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub location_id: LocationId,
    pub receiver_label: StationId,
    pub lat: f64,
    pub long: f64,
    pub detection_frequency: u32,
}

/// A single animal transition between two distinct locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Move {
    pub animal_id: AnimalId,
    pub from: LocationId,
    pub to: LocationId,
}

/// Directed transition count between two locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MovementEdge {
    pub from_location_id: LocationId,
    pub to_location_id: LocationId,
    pub weight: u32,
}

/// Movement edge joined with endpoint coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlottableEdge {
    pub from_location_id: LocationId,
    pub to_location_id: LocationId,
    pub weight: u32,
    pub from_lat: f64,
    pub from_long: f64,
    pub to_lat: f64,
    pub to_long: f64,
}

/// Collapsed location path of one animal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimalPath {
    pub animal_id: AnimalId,
    pub locations: Vec<LocationId>,
}
