//! In-memory detection table and cell parsing
//!
//! Rows are JSON objects so arbitrary metadata columns survive untouched.
//! The column list is the union of keys in row order, keys sorted within a row.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

/// Row-oriented table of raw detection records
#[derive(Debug, Clone, Default)]
pub struct DetectionTable {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl DetectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = Map<String, Value>>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Append a row, registering any column not seen before
    pub fn push_row(&mut self, row: Map<String, Value>) {
        for key in row.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.clone());
            }
        }
        self.rows.push(row);
    }

    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[inline]
    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Timestamp cell as found in detection exports
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampValue {
    IsoString(String),
    EpochMs(i64),
}

impl TimestampValue {
    pub fn from_cell(cell: &Value) -> Option<Self> {
        match cell {
            Value::String(s) => Some(TimestampValue::IsoString(s.trim().to_string())),
            Value::Number(n) => n.as_i64().map(TimestampValue::EpochMs),
            _ => None,
        }
    }

    /// Resolve to a naive UTC timestamp
    ///
    /// Accepts RFC 3339 (offset applied), `YYYY-MM-DD HH:MM:SS[.f]`,
    /// `YYYY-MM-DDTHH:MM:SS[.f]`, and epoch milliseconds.
    pub fn to_naive(&self) -> Result<NaiveDateTime, String> {
        match self {
            TimestampValue::IsoString(s) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                    return Ok(dt.naive_utc());
                }
                for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
                    if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                        return Ok(dt);
                    }
                }
                Err(format!("unrecognized timestamp {:?}", s))
            }
            TimestampValue::EpochMs(ms) => DateTime::from_timestamp_millis(*ms)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| format!("epoch milliseconds {} out of range", ms)),
        }
    }
}

/// Identifier cell: strings are used as-is, numbers and booleans are stringified
pub fn parse_identifier(cell: &Value) -> Result<String, String> {
    match cell {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        Value::String(_) => Err("empty identifier".to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Err("missing value".to_string()),
        other => Err(format!("expected identifier, found {}", other)),
    }
}

pub fn parse_timestamp(cell: &Value) -> Result<NaiveDateTime, String> {
    match cell {
        Value::Null => Err("missing value".to_string()),
        other => TimestampValue::from_cell(other)
            .ok_or_else(|| format!("expected timestamp, found {}", other))?
            .to_naive(),
    }
}

/// Calendar day cell (`YYYY-MM-DD`); a full timestamp is truncated to its date
pub fn parse_date(cell: &Value) -> Result<NaiveDate, String> {
    match cell {
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .or_else(|_| parse_timestamp(cell).map(|ts| ts.date()))
            .map_err(|_| format!("unrecognized date {:?}", s)),
        Value::Null => Err("missing value".to_string()),
        other => Err(format!("expected date string, found {}", other)),
    }
}

/// Coordinate cell; numeric strings are accepted
pub fn parse_coordinate(cell: &Value) -> Result<f64, String> {
    let value = match cell {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("coordinate {} not representable", n))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("unrecognized coordinate {:?}", s))?,
        Value::Null => return Err("missing value".to_string()),
        other => return Err(format!("expected coordinate, found {}", other)),
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("coordinate {} is not finite", value))
    }
}
