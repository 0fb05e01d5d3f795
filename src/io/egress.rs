//! Table egress - writes analysis output tables to files
//!
//! Each table is written in JSONL format (one JSON object per line) to its
//! own file in the output directory. Files are replaced on every run since
//! the tables are recomputed from scratch.

use crate::domain::analysis::{Location, Move, PlottableEdge, ResidencySummary};
use crate::domain::columns::ColumnMap;
use crate::error::Result;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const RESIDENCY_FILE: &str = "residency.jsonl";
pub const EDGES_FILE: &str = "movement_edges.jsonl";
pub const LOCATIONS_FILE: &str = "locations.jsonl";
pub const MOVES_FILE: &str = "moves.jsonl";

/// Egress writer for output tables
pub struct TableEgress {
    out_dir: PathBuf,
}

impl TableEgress {
    pub fn new(out_dir: impl AsRef<Path>) -> Self {
        let out_dir = out_dir.as_ref().to_path_buf();
        info!(out_dir = %out_dir.display(), "egress_initialized");
        Self { out_dir }
    }

    #[inline]
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Write residency rows keyed by the caller's column names
    pub fn write_residency(&self, rows: &[ResidencySummary], columns: &ColumnMap) -> Result<usize> {
        let values: Vec<serde_json::Value> = rows.iter().map(|r| r.to_json_value(columns)).collect();
        self.write_table(RESIDENCY_FILE, &values)
    }

    pub fn write_edges(&self, rows: &[PlottableEdge]) -> Result<usize> {
        self.write_table(EDGES_FILE, rows)
    }

    pub fn write_locations(&self, rows: &[Location]) -> Result<usize> {
        self.write_table(LOCATIONS_FILE, rows)
    }

    pub fn write_moves(&self, rows: &[Move]) -> Result<usize> {
        self.write_table(MOVES_FILE, rows)
    }

    /// Replace `name` in the output directory with one JSON line per row
    fn write_table<T: Serialize>(&self, name: &str, rows: &[T]) -> Result<usize> {
        // Create output directory if it doesn't exist
        if !self.out_dir.exists() {
            fs::create_dir_all(&self.out_dir)?;
        }

        let path = self.out_dir.join(name);
        let mut writer = BufWriter::new(File::create(&path)?);
        let mut bytes = 0usize;
        for row in rows {
            let line = serde_json::to_string(row).map_err(std::io::Error::from)?;
            writeln!(writer, "{}", line)?;
            bytes += line.len() + 1;
        }
        writer.flush()?;

        debug!(file = %path.display(), bytes = bytes, "egress_written");
        info!(file = %path.display(), rows = rows.len(), "table_egressed");

        Ok(rows.len())
    }
}
