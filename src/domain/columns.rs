//! Role-to-column mapping for detection tables
//!
//! Detection exports name their columns differently depending on the
//! receiver vendor and the database they came from. Every operation takes an
//! explicit `ColumnMap` saying which column plays which role.

use serde::{Deserialize, Serialize};

/// Canonical role of a column in a detection table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Animal,
    Station,
    Timestamp,
    Date,
    Lat,
    Long,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Animal => "animal",
            ColumnRole::Station => "station",
            ColumnRole::Timestamp => "timestamp",
            ColumnRole::Date => "date",
            ColumnRole::Lat => "lat",
            ColumnRole::Long => "long",
        }
    }
}

/// Column names used for each role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub animal: String,
    pub station: String,
    pub timestamp: String,
    pub date: String,
    pub lat: String,
    pub long: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            animal: "animal_id".to_string(),
            station: "station".to_string(),
            timestamp: "detection_timestamp_utc".to_string(),
            date: "date".to_string(),
            lat: "deploy_lat".to_string(),
            long: "deploy_long".to_string(),
        }
    }
}

impl ColumnMap {
    /// Column name mapped to a role
    pub fn name(&self, role: ColumnRole) -> &str {
        match role {
            ColumnRole::Animal => &self.animal,
            ColumnRole::Station => &self.station,
            ColumnRole::Timestamp => &self.timestamp,
            ColumnRole::Date => &self.date,
            ColumnRole::Lat => &self.lat,
            ColumnRole::Long => &self.long,
        }
    }

    /// True if `column` is mapped to any role
    pub fn is_mapped(&self, column: &str) -> bool {
        [&self.animal, &self.station, &self.timestamp, &self.date, &self.lat, &self.long]
            .iter()
            .any(|name| name.as_str() == column)
    }

    pub fn with_animal(mut self, name: &str) -> Self {
        self.animal = name.to_string();
        self
    }

    pub fn with_station(mut self, name: &str) -> Self {
        self.station = name.to_string();
        self
    }

    pub fn with_timestamp(mut self, name: &str) -> Self {
        self.timestamp = name.to_string();
        self
    }

    pub fn with_date(mut self, name: &str) -> Self {
        self.date = name.to_string();
        self
    }

    pub fn with_lat(mut self, name: &str) -> Self {
        self.lat = name.to_string();
        self
    }

    pub fn with_long(mut self, name: &str) -> Self {
        self.long = name.to_string();
        self
    }
}
