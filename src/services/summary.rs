//! Study-level summary statistics
//!
//! Plain counts for the log output of the CLI and for reporting layers.

use crate::domain::analysis::Location;
use crate::domain::types::{AnimalId, LocationId};
use crate::services::locations::LocatedDetection;
use chrono::{NaiveDate, NaiveDateTime};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

/// Per-animal detection history summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimalSummary {
    pub animal_id: AnimalId,
    pub detections: u32,
    pub first_detection: NaiveDateTime,
    pub last_detection: NaiveDateTime,
    pub days_detected: u32,
    pub locations_visited: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudySummary {
    pub detections: usize,
    pub animals: usize,
    pub receivers: usize,
    pub locations: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub per_animal: Vec<AnimalSummary>,
}

#[derive(Default)]
struct AnimalAccumulator {
    detections: u32,
    first: Option<NaiveDateTime>,
    last: Option<NaiveDateTime>,
    days: FxHashSet<NaiveDate>,
    locations: FxHashSet<LocationId>,
}

/// Summarize located detections; `per_animal` is ordered by animal id
pub fn summarize_study(located: &[LocatedDetection], locations: &[Location]) -> StudySummary {
    let mut animals: FxHashMap<&AnimalId, AnimalAccumulator> = FxHashMap::default();
    for row in located {
        let d = &row.detection;
        let acc = animals.entry(&d.animal_id).or_default();
        acc.detections += 1;
        acc.first = Some(acc.first.map_or(d.timestamp, |t| t.min(d.timestamp)));
        acc.last = Some(acc.last.map_or(d.timestamp, |t| t.max(d.timestamp)));
        acc.days.insert(d.date);
        acc.locations.insert(row.location_id);
    }

    let mut per_animal: Vec<AnimalSummary> = animals
        .into_iter()
        .filter_map(|(animal_id, acc)| {
            Some(AnimalSummary {
                animal_id: animal_id.clone(),
                detections: acc.detections,
                first_detection: acc.first?,
                last_detection: acc.last?,
                days_detected: acc.days.len() as u32,
                locations_visited: acc.locations.len() as u32,
            })
        })
        .collect();
    per_animal.sort_by(|a, b| a.animal_id.cmp(&b.animal_id));

    let receivers: FxHashSet<_> = locations.iter().map(|l| &l.receiver_label).collect();

    StudySummary {
        detections: located.len(),
        animals: per_animal.len(),
        receivers: receivers.len(),
        locations: locations.len(),
        first_date: located.iter().map(|r| r.detection.date).min(),
        last_date: located.iter().map(|r| r.detection.date).max(),
        per_animal,
    }
}
