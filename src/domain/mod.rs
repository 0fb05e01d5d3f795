//! Domain models - detection rows and derived analysis tables
//!
//! This module contains the canonical data types used throughout the system:
//! - `Detection` - one sensing of a tagged animal by a receiver
//! - `DetectionTable` - raw rows as loaded, before column projection
//! - `ColumnMap` - which column plays which role
//! - `ResidencySummary`, `Location`, `MovementEdge` - the output tables

pub mod analysis;
pub mod columns;
pub mod table;
pub mod types;

// Re-export commonly used types at module level
pub use analysis::{
    AnimalPath, Location, Move, MovementEdge, PlottableEdge, ResidencyEvent, ResidencySummary,
};
pub use columns::{ColumnMap, ColumnRole};
pub use table::DetectionTable;
pub use types::{AnimalId, Detection, DurationUnit, LocationId, StationId};
