//! Movement graph construction
//!
//! Turns each animal's location history into transitions between distinct
//! locations and counts them into a directed, weighted edge list.
//!
//! Unlike residency segmentation, nothing here re-sorts: rows must already
//! be chronological per animal. The analysis pipeline sorts by timestamp
//! before calling in.

use crate::domain::analysis::{AnimalPath, Location, Move, MovementEdge, PlottableEdge};
use crate::domain::columns::ColumnMap;
use crate::domain::table::DetectionTable;
use crate::domain::types::{AnimalId, LocationId};
use crate::error::{AnalysisError, Result};
use crate::services::locations::{resolve_locations, LocatedDetection};
use crate::services::schema::{project_detections, Requirement};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

/// Aggregated edges plus the per-animal transitions they were counted from
#[derive(Debug, Clone, PartialEq)]
pub struct MovementGraph {
    pub edges: Vec<MovementEdge>,
    pub moves: Vec<Move>,
}

/// Collapse consecutive duplicates: `[1, 1, 2, 2, 1]` becomes `[1, 2, 1]`
pub fn collapse_runs<T: PartialEq + Copy>(sequence: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut collapsed: Vec<T> = Vec::new();
    for item in sequence {
        if collapsed.last() != Some(&item) {
            collapsed.push(item);
        }
    }
    collapsed
}

/// Build the movement graph from located detections
///
/// Precondition: detections are in chronological order within each animal.
/// Animals are processed in order of first appearance. A detection whose
/// location is missing from `locations` fails with `AnalysisError::Integrity`.
pub fn build_movement_graph(
    located: &[LocatedDetection],
    locations: &[Location],
) -> Result<MovementGraph> {
    let known: FxHashMap<LocationId, &Location> =
        locations.iter().map(|l| (l.location_id, l)).collect();

    // Per-animal collapsed sequences, built in a single streaming pass
    let mut order: Vec<&AnimalId> = Vec::new();
    let mut sequences: FxHashMap<&AnimalId, Vec<LocationId>> = FxHashMap::default();
    for row in located {
        let animal_id = &row.detection.animal_id;
        if !known.contains_key(&row.location_id) {
            return Err(AnalysisError::integrity(row.location_id, format!("animal {}", animal_id)));
        }

        let sequence = sequences.entry(animal_id).or_insert_with(|| {
            order.push(animal_id);
            Vec::new()
        });
        if sequence.last() != Some(&row.location_id) {
            sequence.push(row.location_id);
        }
    }

    let mut moves: Vec<Move> = Vec::new();
    for animal_id in &order {
        let Some(sequence) = sequences.get(animal_id) else {
            continue;
        };
        let before = moves.len();
        moves.extend(sequence.windows(2).map(|pair| Move {
            animal_id: (*animal_id).clone(),
            from: pair[0],
            to: pair[1],
        }));
        debug!(
            animal_id = %animal_id,
            collapsed_len = sequence.len(),
            transitions = moves.len() - before,
            "animal_path_collapsed"
        );
    }

    let edges = aggregate_moves(&moves);

    info!(
        animals = order.len(),
        moves = moves.len(),
        edges = edges.len(),
        "movement_graph_built"
    );

    Ok(MovementGraph { edges, moves })
}

/// Validate, project, resolve locations and build the graph from a raw table
///
/// Only the movement columns are required; a missing date column is fine.
/// Rows are taken in table order, so the table must already be
/// chronological per animal.
pub fn build_movement_graph_from_table(
    table: &DetectionTable,
    columns: &ColumnMap,
) -> Result<(Vec<Location>, MovementGraph)> {
    let detections = project_detections(table, columns, Requirement::Movement)?;
    let (located, locations) = resolve_locations(detections);
    let graph = build_movement_graph(&located, &locations)?;
    Ok((locations, graph))
}

/// Count moves per directed (from, to) pair, ordered by (from, to)
pub fn aggregate_moves(moves: &[Move]) -> Vec<MovementEdge> {
    let mut counts: FxHashMap<(LocationId, LocationId), u32> = FxHashMap::default();
    for m in moves {
        *counts.entry((m.from, m.to)).or_insert(0) += 1;
    }

    let mut edges: Vec<MovementEdge> = counts
        .into_iter()
        .map(|((from, to), weight)| MovementEdge {
            from_location_id: from,
            to_location_id: to,
            weight,
        })
        .collect();
    edges.sort_by_key(|e| (e.from_location_id, e.to_location_id));
    edges
}

/// Attach endpoint coordinates to each edge
pub fn join_edge_coordinates(
    edges: &[MovementEdge],
    locations: &[Location],
) -> Result<Vec<PlottableEdge>> {
    let by_id: FxHashMap<LocationId, &Location> =
        locations.iter().map(|l| (l.location_id, l)).collect();

    edges
        .iter()
        .map(|edge| -> Result<PlottableEdge> {
            let context = || format!("edge {} -> {}", edge.from_location_id, edge.to_location_id);
            let from = by_id
                .get(&edge.from_location_id)
                .ok_or_else(|| AnalysisError::integrity(edge.from_location_id, context()))?;
            let to = by_id
                .get(&edge.to_location_id)
                .ok_or_else(|| AnalysisError::integrity(edge.to_location_id, context()))?;
            Ok(PlottableEdge {
                from_location_id: edge.from_location_id,
                to_location_id: edge.to_location_id,
                weight: edge.weight,
                from_lat: from.lat,
                from_long: from.long,
                to_lat: to.lat,
                to_long: to.long,
            })
        })
        .collect()
}

/// Rebuild each animal's collapsed path from its moves
///
/// Animals without moves (one distinct location) do not appear.
pub fn paths_by_animal(moves: &[Move]) -> Vec<AnimalPath> {
    let mut paths: Vec<AnimalPath> = Vec::new();
    let mut index: FxHashMap<&AnimalId, usize> = FxHashMap::default();

    for m in moves {
        match index.get(&m.animal_id) {
            Some(&idx) => paths[idx].locations.push(m.to),
            None => {
                index.insert(&m.animal_id, paths.len());
                paths.push(AnimalPath { animal_id: m.animal_id.clone(), locations: vec![m.from, m.to] });
            }
        }
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Detection, StationId};
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
    use serde_json::{json, Value};

    fn t(minutes: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
            + TimeDelta::minutes(minutes)
    }

    fn located(animal: &str, ids: &[u32]) -> Vec<LocatedDetection> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| LocatedDetection {
                detection: Detection::new(animal, format!("R{}", id).as_str(), t(i as i64), 0.0, 0.0),
                location_id: LocationId(*id),
            })
            .collect()
    }

    fn location(id: u32, lat: f64, long: f64) -> Location {
        Location {
            location_id: LocationId(id),
            receiver_label: StationId(format!("R{}", id)),
            lat,
            long,
            detection_frequency: 1,
        }
    }

    #[test]
    fn test_collapse_runs() {
        assert_eq!(collapse_runs([1, 1, 1, 2, 2, 1]), vec![1, 2, 1]);
        assert_eq!(collapse_runs([3]), vec![3]);
        assert!(collapse_runs(Vec::<u32>::new()).is_empty());
    }

    #[test]
    fn test_graph_collapse() {
        let rows = located("A1", &[1, 1, 2, 2, 1]);
        let locations = vec![location(1, 45.0, -83.0), location(2, 46.0, -84.0)];
        let graph = build_movement_graph(&rows, &locations).unwrap();

        assert_eq!(graph.moves.len(), 2);
        assert_eq!(
            graph.edges,
            vec![
                MovementEdge { from_location_id: LocationId(1), to_location_id: LocationId(2), weight: 1 },
                MovementEdge { from_location_id: LocationId(2), to_location_id: LocationId(1), weight: 1 },
            ]
        );
        assert!(graph.edges.iter().all(|e| e.from_location_id != e.to_location_id));
    }

    #[test]
    fn test_weights_aggregate_across_animals() {
        let mut rows = located("A1", &[1, 2, 1, 2]);
        rows.extend(located("A2", &[1, 1, 2]));
        rows.extend(located("A3", &[2]));
        let locations = vec![location(1, 45.0, -83.0), location(2, 46.0, -84.0)];
        let graph = build_movement_graph(&rows, &locations).unwrap();

        assert_eq!(graph.moves.len(), 4);
        let one_to_two = graph
            .edges
            .iter()
            .find(|e| e.from_location_id == LocationId(1) && e.to_location_id == LocationId(2))
            .unwrap();
        assert_eq!(one_to_two.weight, 3);
        // Direction is preserved: 2 -> 1 counted separately
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[1].weight, 1);
        assert!(graph.moves.iter().all(|m| m.animal_id.0 != "A3"));
    }

    #[test]
    fn test_interleaved_animals_keep_their_own_sequence() {
        let mut rows = Vec::new();
        for (a, b) in located("A1", &[1, 2, 3]).into_iter().zip(located("A2", &[3, 3, 1])) {
            rows.push(a);
            rows.push(b);
        }
        let locations = vec![location(1, 0.0, 0.0), location(2, 0.0, 1.0), location(3, 1.0, 1.0)];
        let graph = build_movement_graph(&rows, &locations).unwrap();

        let a1: Vec<(u32, u32)> = graph
            .moves
            .iter()
            .filter(|m| m.animal_id.0 == "A1")
            .map(|m| (m.from.0, m.to.0))
            .collect();
        assert_eq!(a1, vec![(1, 2), (2, 3)]);
        let a2: Vec<(u32, u32)> = graph
            .moves
            .iter()
            .filter(|m| m.animal_id.0 == "A2")
            .map(|m| (m.from.0, m.to.0))
            .collect();
        assert_eq!(a2, vec![(3, 1)]);
    }

    #[test]
    fn test_unknown_location_is_integrity_error() {
        let rows = located("A1", &[1, 9]);
        let locations = vec![location(1, 45.0, -83.0)];
        let err = build_movement_graph(&rows, &locations).unwrap_err();
        let AnalysisError::Integrity { location_id, context } = err else {
            panic!("Expected Integrity variant");
        };
        assert_eq!(location_id, LocationId(9));
        assert!(context.contains("A1"));
    }

    #[test]
    fn test_relocated_receiver_counts_as_movement() {
        let detections = vec![
            Detection::new("A1", "R1", t(0), 45.0, -83.0),
            Detection::new("A1", "R1", t(5), 45.0, -83.0),
            Detection::new("A1", "R1", t(60), 45.2, -83.1),
        ];
        let (located, locations) = resolve_locations(detections);
        let graph = build_movement_graph(&located, &locations).unwrap();

        assert_eq!(graph.edges.len(), 1);
        assert_ne!(graph.edges[0].from_location_id, graph.edges[0].to_location_id);
        assert_eq!(graph.edges[0].weight, 1);
    }

    #[test]
    fn test_join_edge_coordinates() {
        let edges = vec![MovementEdge {
            from_location_id: LocationId(1),
            to_location_id: LocationId(2),
            weight: 4,
        }];
        let locations = vec![location(1, 45.0, -83.0), location(2, 46.0, -84.0)];
        let joined = join_edge_coordinates(&edges, &locations).unwrap();

        assert_eq!(joined.len(), 1);
        assert_eq!((joined[0].from_lat, joined[0].from_long), (45.0, -83.0));
        assert_eq!((joined[0].to_lat, joined[0].to_long), (46.0, -84.0));
        assert_eq!(joined[0].weight, 4);

        let err = join_edge_coordinates(&edges, &locations[..1]).unwrap_err();
        assert!(matches!(err, AnalysisError::Integrity { location_id: LocationId(2), .. }));
    }

    #[test]
    fn test_paths_by_animal() {
        let mut rows = located("A1", &[1, 1, 2, 3, 3, 1]);
        rows.extend(located("A2", &[2, 2]));
        let locations = vec![location(1, 0.0, 0.0), location(2, 0.0, 1.0), location(3, 1.0, 1.0)];
        let graph = build_movement_graph(&rows, &locations).unwrap();
        let paths = paths_by_animal(&graph.moves);

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].animal_id, AnimalId::from("A1"));
        assert_eq!(
            paths[0].locations,
            vec![LocationId(1), LocationId(2), LocationId(3), LocationId(1)]
        );
    }

    fn table(rows: Vec<Value>) -> DetectionTable {
        DetectionTable::from_rows(rows.into_iter().map(|r| r.as_object().cloned().unwrap()))
    }

    #[test]
    fn test_from_table_without_date_column() {
        let t = table(vec![
            json!({"animal_id": "A1", "station": "R1", "detection_timestamp_utc": "2024-07-01 00:00:00", "deploy_lat": 45.0, "deploy_long": -83.0}),
            json!({"animal_id": "A1", "station": "R2", "detection_timestamp_utc": "2024-07-01 01:00:00", "deploy_lat": 46.0, "deploy_long": -83.0}),
            json!({"animal_id": "A1", "station": "R1", "detection_timestamp_utc": "2024-07-02 00:00:00", "deploy_lat": 45.0, "deploy_long": -83.0}),
        ]);

        let (locations, graph) = build_movement_graph_from_table(&t, &ColumnMap::default()).unwrap();

        assert_eq!(locations.len(), 2);
        assert_eq!(graph.moves.len(), 2);
        assert_eq!(graph.edges.len(), 2);
    }

    #[test]
    fn test_from_table_rejects_missing_timestamp() {
        let t = table(vec![
            json!({"animal_id": "A1", "station": "R1", "deploy_lat": 45.0, "deploy_long": -83.0}),
        ]);

        let err = build_movement_graph_from_table(&t, &ColumnMap::default()).unwrap_err();

        let AnalysisError::Schema { missing, .. } = err else {
            panic!("Expected Schema variant");
        };
        assert_eq!(missing, vec!["detection_timestamp_utc".to_string()]);
    }
}
