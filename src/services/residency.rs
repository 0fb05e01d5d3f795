//! Residency segmentation
//!
//! Splits each (animal, day) detection stream into stationary runs and sums
//! their durations per station.
//!
//! Key behaviors:
//! - Partitions are sorted by timestamp here; callers need not pre-sort
//! - The first detection of a partition has no predecessor and starts no event
//! - A run is a maximal block of rows sharing the same (previous, current)
//!   station pair, so only repeated A->A transitions grow a run past one row
//! - Each event is attributed to the station the run departs from
//! - Segmentation restarts at every calendar day, so an overnight stay is
//!   reported as two events

use crate::domain::analysis::{ResidencyEvent, ResidencySummary};
use crate::domain::columns::ColumnMap;
use crate::domain::table::DetectionTable;
use crate::domain::types::{AnimalId, Detection, DurationUnit, StationId};
use crate::error::Result;
use crate::services::schema::{project_detections, Requirement};
use chrono::{NaiveDate, NaiveDateTime};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

/// Accumulator for the run currently being extended within one partition
struct Run<'a> {
    from: &'a StationId,
    to: &'a StationId,
    run_id: u32,
    detection_count: u32,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl<'a> Run<'a> {
    fn open(run_id: u32, prev: &'a Detection, current: &'a Detection) -> Self {
        Self {
            from: &prev.station_id,
            to: &current.station_id,
            run_id,
            detection_count: 1,
            start: prev.timestamp,
            end: current.timestamp,
        }
    }

    #[inline]
    fn matches(&self, prev: &Detection, current: &Detection) -> bool {
        *self.from == prev.station_id && *self.to == current.station_id
    }

    fn extend(&mut self, prev: &Detection, current: &Detection) {
        self.detection_count += 1;
        self.start = self.start.min(prev.timestamp);
        self.end = self.end.max(current.timestamp);
    }

    fn close(self, date: NaiveDate, animal_id: &AnimalId, unit: DurationUnit) -> ResidencyEvent {
        ResidencyEvent {
            date,
            animal_id: animal_id.clone(),
            station_id: self.from.clone(),
            run_id: self.run_id,
            detection_count: self.detection_count,
            start: self.start,
            end: self.end,
            duration: unit.convert(self.end - self.start),
        }
    }
}

/// Segment one time-ordered partition, appending its events to `out`
fn segment_partition(
    date: NaiveDate,
    animal_id: &AnimalId,
    rows: &[&Detection],
    unit: DurationUnit,
    out: &mut Vec<ResidencyEvent>,
) {
    let mut current: Option<Run<'_>> = None;
    let mut next_run_id = 0u32;

    for pair in rows.windows(2) {
        let (prev, row) = (pair[0], pair[1]);

        if let Some(run) = current.as_mut().filter(|run| run.matches(prev, row)) {
            run.extend(prev, row);
            continue;
        }

        let opened = Run::open(next_run_id, prev, row);
        next_run_id += 1;
        if let Some(finished) = current.replace(opened) {
            out.push(finished.close(date, animal_id, unit));
        }
    }

    if let Some(finished) = current {
        out.push(finished.close(date, animal_id, unit));
    }
}

/// Segment detections into residency events
///
/// Events are ordered by (date, animal_id, run_id).
pub fn segment_residency(detections: &[Detection], unit: DurationUnit) -> Vec<ResidencyEvent> {
    let mut partitions: FxHashMap<(NaiveDate, &AnimalId), Vec<&Detection>> = FxHashMap::default();
    for detection in detections {
        partitions.entry((detection.date, &detection.animal_id)).or_default().push(detection);
    }

    let mut keys: Vec<(NaiveDate, &AnimalId)> = partitions.keys().copied().collect();
    keys.sort();

    let mut events = Vec::new();
    for key in keys {
        let Some(rows) = partitions.get_mut(&key) else {
            continue;
        };
        // Stable: equal timestamps keep their input order
        rows.sort_by_key(|d| d.timestamp);

        let before = events.len();
        segment_partition(key.0, key.1, rows, unit, &mut events);
        debug!(
            date = %key.0,
            animal_id = %key.1,
            detections = rows.len(),
            events = events.len() - before,
            "partition_segmented"
        );
    }

    events
}

/// Sum event durations per (date, animal, station)
///
/// Disjoint visits to the same station on the same day are added together.
/// Output is ordered by (date, animal_id, station_id).
pub fn summarize_residency(events: &[ResidencyEvent]) -> Vec<ResidencySummary> {
    let mut totals: FxHashMap<(NaiveDate, &AnimalId, &StationId), f64> = FxHashMap::default();
    for event in events {
        *totals.entry((event.date, &event.animal_id, &event.station_id)).or_insert(0.0) +=
            event.duration;
    }

    let mut summaries: Vec<ResidencySummary> = totals
        .into_iter()
        .map(|((date, animal_id, station_id), total_duration)| ResidencySummary {
            date,
            animal_id: animal_id.clone(),
            station_id: station_id.clone(),
            total_duration,
        })
        .collect();
    summaries.sort_by(|a, b| {
        (a.date, &a.animal_id, &a.station_id).cmp(&(b.date, &b.animal_id, &b.station_id))
    });
    summaries
}

/// Residency per (date, animal, station) in the requested unit
pub fn compute_residency(detections: &[Detection], unit: DurationUnit) -> Vec<ResidencySummary> {
    let events = segment_residency(detections, unit);
    let summaries = summarize_residency(&events);

    info!(
        detections = detections.len(),
        events = events.len(),
        rows = summaries.len(),
        unit = %unit,
        "residency_computed"
    );

    summaries
}

/// Validate, project and compute residency straight from a raw table
pub fn compute_residency_from_table(
    table: &DetectionTable,
    columns: &ColumnMap,
    unit: DurationUnit,
) -> Result<Vec<ResidencySummary>> {
    let detections = project_detections(table, columns, Requirement::Residency)?;
    Ok(compute_residency(&detections, unit))
}
