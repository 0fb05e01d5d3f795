//! Full batch analysis over one detection table
//!
//! Produces every output table or fails before returning any of them.

use crate::domain::analysis::{Location, Move, MovementEdge, PlottableEdge, ResidencySummary};
use crate::domain::columns::ColumnMap;
use crate::domain::table::DetectionTable;
use crate::domain::types::DurationUnit;
use crate::error::Result;
use crate::services::locations::resolve_locations;
use crate::services::movement::{build_movement_graph, join_edge_coordinates};
use crate::services::residency::compute_residency;
use crate::services::schema::{project_detections, Requirement};
use crate::services::summary::{summarize_study, StudySummary};
use tracing::info;

/// All tables derived from one detection table
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutput {
    pub residency: Vec<ResidencySummary>,
    pub locations: Vec<Location>,
    pub edges: Vec<MovementEdge>,
    pub plottable_edges: Vec<PlottableEdge>,
    pub moves: Vec<Move>,
    pub summary: StudySummary,
}

/// Run residency, location resolution and the movement graph
///
/// The table is validated against the residency requirement, which covers
/// every column the movement graph needs. Detections are stable-sorted by
/// timestamp before location resolution so each animal's rows are
/// chronological, as the movement graph requires.
pub fn run_analysis(
    table: &DetectionTable,
    columns: &ColumnMap,
    unit: DurationUnit,
) -> Result<AnalysisOutput> {
    let mut detections = project_detections(table, columns, Requirement::Residency)?;

    let residency = compute_residency(&detections, unit);

    detections.sort_by_key(|d| d.timestamp);
    let (located, locations) = resolve_locations(detections);
    let graph = build_movement_graph(&located, &locations)?;
    let plottable_edges = join_edge_coordinates(&graph.edges, &locations)?;
    let summary = summarize_study(&located, &locations);

    info!(
        detections = summary.detections,
        animals = summary.animals,
        residency_rows = residency.len(),
        locations = locations.len(),
        edges = graph.edges.len(),
        "analysis_complete"
    );

    Ok(AnalysisOutput {
        residency,
        locations,
        edges: graph.edges,
        plottable_edges,
        moves: graph.moves,
        summary,
    })
}
