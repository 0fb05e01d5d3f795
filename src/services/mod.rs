//! Services - the analysis algorithms
//!
//! This module contains the core analysis services:
//! - `schema` - Required-column validation and row projection
//! - `residency` - Per-day stationary run segmentation and dwell totals
//! - `locations` - Receiver location identity and detection frequency
//! - `movement` - Run-length reduced transitions and the weighted edge list
//! - `summary` - Study-level counts for reporting
//! - `analysis` - Runs all of the above over one table

pub mod analysis;
pub mod locations;
pub mod movement;
pub mod residency;
pub mod schema;
pub mod summary;

// Re-export commonly used types
pub use analysis::{run_analysis, AnalysisOutput};
pub use locations::{resolve_locations, LocatedDetection};
pub use movement::{
    build_movement_graph, build_movement_graph_from_table, join_edge_coordinates, paths_by_animal,
    MovementGraph,
};
pub use residency::{compute_residency, compute_residency_from_table, segment_residency};
pub use schema::{project_detections, validate_columns, Requirement};
pub use summary::{summarize_study, StudySummary};
