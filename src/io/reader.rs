//! Detection table loader - reads JSONL exports
//!
//! One JSON object per line. Blank lines are skipped; any other line that is
//! not a JSON object aborts the load with its 1-based line number.

use crate::domain::table::DetectionTable;
use crate::error::{AnalysisError, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// Read a detection table from a JSONL file
pub fn read_detection_table(path: impl AsRef<Path>) -> Result<DetectionTable> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let table = parse_detection_table(file)?;

    info!(
        path = %path.display(),
        rows = table.len(),
        columns = ?table.columns(),
        "detection_table_loaded"
    );

    Ok(table)
}

/// Parse a detection table from any JSONL reader
pub fn parse_detection_table(reader: impl Read) -> Result<DetectionTable> {
    let mut table = DetectionTable::new();
    let mut skipped = 0usize;

    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            skipped += 1;
            continue;
        }
        let row: Map<String, Value> = serde_json::from_str(&line)
            .map_err(|source| AnalysisError::Json { line: idx + 1, source })?;
        table.push_row(row);
    }

    debug!(rows = table.len(), blank_lines = skipped, "jsonl_parsed");
    Ok(table)
}
