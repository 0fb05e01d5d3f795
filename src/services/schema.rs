//! Schema validation and column projection
//!
//! Both analyses run `project_detections` first: it checks that every
//! required column exists (reporting all missing ones at once) and then
//! parses each row into a typed `Detection`.

use crate::domain::columns::{ColumnMap, ColumnRole};
use crate::domain::table::{
    parse_coordinate, parse_date, parse_identifier, parse_timestamp, DetectionTable,
};
use crate::domain::types::{AnimalId, Detection, StationId};
use crate::error::{AnalysisError, Result};
use serde_json::{Map, Value};
use tracing::debug;

/// Which analysis the table is being prepared for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Residency needs every role, including the calendar day
    Residency,
    /// Location resolution and the movement graph derive the day from the timestamp
    Movement,
}

impl Requirement {
    pub fn roles(&self) -> &'static [ColumnRole] {
        match self {
            Requirement::Residency => &[
                ColumnRole::Animal,
                ColumnRole::Station,
                ColumnRole::Timestamp,
                ColumnRole::Date,
                ColumnRole::Lat,
                ColumnRole::Long,
            ],
            Requirement::Movement => &[
                ColumnRole::Animal,
                ColumnRole::Station,
                ColumnRole::Timestamp,
                ColumnRole::Lat,
                ColumnRole::Long,
            ],
        }
    }
}

/// Fail with `AnalysisError::Schema` if any required column is absent
pub fn validate_columns(
    table: &DetectionTable,
    columns: &ColumnMap,
    requirement: Requirement,
) -> Result<()> {
    let mut missing: Vec<String> = Vec::new();
    for role in requirement.roles() {
        let name = columns.name(*role);
        if !table.has_column(name) && !missing.iter().any(|m| m == name) {
            missing.push(name.to_string());
        }
    }

    if missing.is_empty() {
        return Ok(());
    }

    debug!(missing = ?missing, requirement = ?requirement, "schema_validation_failed");
    Err(AnalysisError::Schema { missing, available: table.columns().to_vec() })
}

/// Validate and parse every row into a `Detection`
///
/// Unmapped columns are kept in `Detection::metadata`. When the date column is
/// absent (allowed for `Requirement::Movement`) the day comes from the timestamp.
pub fn project_detections(
    table: &DetectionTable,
    columns: &ColumnMap,
    requirement: Requirement,
) -> Result<Vec<Detection>> {
    validate_columns(table, columns, requirement)?;

    let has_date = table.has_column(&columns.date);
    let mut detections = Vec::with_capacity(table.len());

    for (idx, row) in table.rows().iter().enumerate() {
        let animal_id = field(idx, row, columns, ColumnRole::Animal, parse_identifier)?;
        let station_id = field(idx, row, columns, ColumnRole::Station, parse_identifier)?;
        let timestamp = field(idx, row, columns, ColumnRole::Timestamp, parse_timestamp)?;
        let date = if has_date {
            field(idx, row, columns, ColumnRole::Date, parse_date)?
        } else {
            timestamp.date()
        };
        let lat = field(idx, row, columns, ColumnRole::Lat, parse_coordinate)?;
        let long = field(idx, row, columns, ColumnRole::Long, parse_coordinate)?;

        let metadata = row
            .iter()
            .filter(|(key, _)| !columns.is_mapped(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        detections.push(Detection {
            animal_id: AnimalId(animal_id),
            station_id: StationId(station_id),
            timestamp,
            date,
            lat,
            long,
            metadata,
        });
    }

    debug!(rows = detections.len(), requirement = ?requirement, "detections_projected");
    Ok(detections)
}

/// Parse the cell mapped to `role`, treating an absent key as null
fn field<T>(
    idx: usize,
    row: &Map<String, Value>,
    columns: &ColumnMap,
    role: ColumnRole,
    parser: fn(&Value) -> std::result::Result<T, String>,
) -> Result<T> {
    let name = columns.name(role);
    let value = row.get(name).unwrap_or(&Value::Null);
    parser(value).map_err(|reason| AnalysisError::invalid_value(idx, name, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(rows: Vec<Value>) -> DetectionTable {
        DetectionTable::from_rows(rows.into_iter().map(|r| r.as_object().cloned().unwrap()))
    }

    fn full_row() -> Value {
        json!({
            "animal_id": "A1",
            "station": "R1",
            "detection_timestamp_utc": "2024-05-01 10:00:00",
            "date": "2024-05-01",
            "deploy_lat": 45.0,
            "deploy_long": -83.0,
            "sensor_value": 12
        })
    }

    #[test]
    fn test_missing_timestamp_named_exactly() {
        let mut row = full_row();
        row.as_object_mut().unwrap().remove("detection_timestamp_utc");
        let t = table(vec![row]);

        let err = validate_columns(&t, &ColumnMap::default(), Requirement::Residency).unwrap_err();
        let AnalysisError::Schema { missing, available } = err else {
            panic!("Expected Schema variant");
        };
        assert_eq!(missing, vec!["detection_timestamp_utc".to_string()]);
        assert!(available.contains(&"animal_id".to_string()));
    }

    #[test]
    fn test_all_missing_columns_reported() {
        let t = table(vec![json!({"animal_id": "A1"})]);
        let err = validate_columns(&t, &ColumnMap::default(), Requirement::Residency).unwrap_err();
        let AnalysisError::Schema { missing, .. } = err else {
            panic!("Expected Schema variant");
        };
        assert_eq!(missing.len(), 5);
    }

    #[test]
    fn test_movement_does_not_require_date() {
        let mut row = full_row();
        row.as_object_mut().unwrap().remove("date");
        let t = table(vec![row]);

        assert!(validate_columns(&t, &ColumnMap::default(), Requirement::Residency).is_err());
        let detections = project_detections(&t, &ColumnMap::default(), Requirement::Movement).unwrap();
        assert_eq!(detections[0].date, detections[0].timestamp.date());
    }

    #[test]
    fn test_projection_with_renamed_columns() {
        let t = table(vec![json!({
            "fish": 17,
            "receiver": "R9",
            "ts": "2024-05-01T10:00:00",
            "day": "2024-05-01",
            "y": "45.5",
            "x": -83.25
        })]);
        let columns = ColumnMap::default()
            .with_animal("fish")
            .with_station("receiver")
            .with_timestamp("ts")
            .with_date("day")
            .with_lat("y")
            .with_long("x");

        let detections = project_detections(&t, &columns, Requirement::Residency).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].animal_id, AnimalId::from("17"));
        assert_eq!(detections[0].station_id, StationId::from("R9"));
        assert_eq!(detections[0].lat, 45.5);
        assert_eq!(detections[0].long, -83.25);
    }

    #[test]
    fn test_metadata_carried_through() {
        let t = table(vec![full_row()]);
        let detections = project_detections(&t, &ColumnMap::default(), Requirement::Residency).unwrap();
        let mut expected = Map::new();
        expected.insert("sensor_value".to_string(), json!(12));
        assert_eq!(detections[0].metadata, expected);
    }

    #[test]
    fn test_unparsable_cell_reports_row_and_column() {
        let mut second = full_row();
        second["deploy_lat"] = json!("north");
        let t = table(vec![full_row(), second]);

        let err = project_detections(&t, &ColumnMap::default(), Requirement::Residency).unwrap_err();
        let AnalysisError::InvalidValue { row, column, .. } = err else {
            panic!("Expected InvalidValue variant");
        };
        assert_eq!(row, 1);
        assert_eq!(column, "deploy_lat");
    }

    #[test]
    fn test_validation_does_not_mutate_table() {
        let t = table(vec![full_row()]);
        let before = t.rows().to_vec();
        project_detections(&t, &ColumnMap::default(), Requirement::Residency).unwrap();
        assert_eq!(t.rows(), before.as_slice());
    }
}
