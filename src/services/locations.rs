//! Location resolution
//!
//! A location is a receiver label at one exact pair of coordinates. When a
//! receiver is pulled and redeployed elsewhere under the same label, its
//! detections resolve to a second location, so movement between the two
//! positions is counted as real movement.

use crate::domain::analysis::Location;
use crate::domain::types::{Detection, LocationId, StationId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Detection tagged with its resolved location
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedDetection {
    pub detection: Detection,
    pub location_id: LocationId,
}

/// Exact-match key for (label, lat, long)
///
/// Coordinates compare by bit pattern; `-0.0` is folded into `0.0` so the two
/// zero encodings are not split into separate locations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LocationKey {
    label: StationId,
    lat_bits: u64,
    long_bits: u64,
}

impl LocationKey {
    fn of(detection: &Detection) -> Self {
        Self {
            label: detection.station_id.clone(),
            lat_bits: canonical_bits(detection.lat),
            long_bits: canonical_bits(detection.long),
        }
    }

    #[inline]
    fn lat(&self) -> f64 {
        f64::from_bits(self.lat_bits)
    }

    #[inline]
    fn long(&self) -> f64 {
        f64::from_bits(self.long_bits)
    }

    fn cmp_sorted(&self, other: &Self) -> Ordering {
        self.label
            .cmp(&other.label)
            .then_with(|| self.lat().total_cmp(&other.lat()))
            .then_with(|| self.long().total_cmp(&other.long()))
    }
}

#[inline]
fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

/// Assign a location to every detection and build the location table
///
/// Location ids are 1-based ordinals of the distinct (label, lat, long)
/// tuples in sorted order, so numbering does not depend on row order.
/// Detections keep their input order. Every returned location has a
/// non-zero detection frequency.
pub fn resolve_locations(detections: Vec<Detection>) -> (Vec<LocatedDetection>, Vec<Location>) {
    let keys: Vec<LocationKey> = detections.iter().map(LocationKey::of).collect();

    let mut seen: FxHashSet<&LocationKey> = FxHashSet::default();
    let mut distinct: Vec<&LocationKey> = keys.iter().filter(|key| seen.insert(*key)).collect();
    distinct.sort_by(|a, b| a.cmp_sorted(b));

    let mut ids: FxHashMap<&LocationKey, LocationId> = FxHashMap::default();
    let mut locations: Vec<Location> = Vec::with_capacity(distinct.len());
    for (idx, key) in distinct.into_iter().enumerate() {
        let location_id = LocationId(idx as u32 + 1);
        ids.insert(key, location_id);
        locations.push(Location {
            location_id,
            receiver_label: key.label.clone(),
            lat: key.lat(),
            long: key.long(),
            detection_frequency: 0,
        });
    }

    let mut located = Vec::with_capacity(detections.len());
    for (detection, key) in detections.into_iter().zip(&keys) {
        let location_id = ids[key];
        // Ids are dense and 1-based, so the table index is id - 1
        locations[location_id.0 as usize - 1].detection_frequency += 1;
        located.push(LocatedDetection { detection, location_id });
    }

    for location in &locations {
        debug!(
            location_id = %location.location_id,
            receiver = %location.receiver_label,
            lat = location.lat,
            long = location.long,
            detections = location.detection_frequency,
            "location_resolved"
        );
    }

    let receivers = {
        let mut labels: Vec<&StationId> = locations.iter().map(|l| &l.receiver_label).collect();
        labels.dedup();
        labels.len()
    };
    info!(
        detections = located.len(),
        locations = locations.len(),
        receivers = receivers,
        "locations_resolved"
    );

    (located, locations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

    fn t(minutes: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
            + TimeDelta::minutes(minutes)
    }

    #[test]
    fn test_relocated_receiver_is_two_locations() {
        let detections = vec![
            Detection::new("A1", "R1", t(0), 45.0, -83.0),
            Detection::new("A1", "R1", t(10), 45.5, -83.0),
            Detection::new("A2", "R1", t(20), 45.0, -83.0),
        ];
        let (located, locations) = resolve_locations(detections);

        assert_eq!(locations.len(), 2);
        assert_ne!(located[0].location_id, located[1].location_id);
        assert_eq!(located[0].location_id, located[2].location_id);
        assert!(locations.iter().all(|l| l.receiver_label == StationId::from("R1")));
    }

    #[test]
    fn test_detection_frequency_counts_rows() {
        let detections = vec![
            Detection::new("A1", "R2", t(0), 44.0, -82.0),
            Detection::new("A1", "R1", t(1), 45.0, -83.0),
            Detection::new("A1", "R1", t(2), 45.0, -83.0),
            Detection::new("A2", "R1", t(3), 45.0, -83.0),
        ];
        let (_, locations) = resolve_locations(detections);

        assert_eq!(locations.len(), 2);
        // Sorted by label: R1 first
        assert_eq!(locations[0].location_id, LocationId(1));
        assert_eq!(locations[0].receiver_label, StationId::from("R1"));
        assert_eq!(locations[0].detection_frequency, 3);
        assert_eq!(locations[1].detection_frequency, 1);
        let total: u32 = locations.iter().map(|l| l.detection_frequency).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_numbering_independent_of_row_order() {
        let forward = vec![
            Detection::new("A1", "R3", t(0), 1.0, 1.0),
            Detection::new("A1", "R1", t(1), 2.0, 2.0),
            Detection::new("A1", "R2", t(2), 3.0, 3.0),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let (_, a) = resolve_locations(forward);
        let (_, b) = resolve_locations(backward);
        assert_eq!(a, b);
    }

    #[test]
    fn test_signed_zero_is_one_location() {
        let detections = vec![
            Detection::new("A1", "R1", t(0), 0.0, 10.0),
            Detection::new("A1", "R1", t(1), -0.0, 10.0),
        ];
        let (located, locations) = resolve_locations(detections);
        assert_eq!(locations.len(), 1);
        assert_eq!(located[0].location_id, located[1].location_id);
    }

    #[test]
    fn test_empty_input() {
        let (located, locations) = resolve_locations(Vec::new());
        assert!(located.is_empty());
        assert!(locations.is_empty());
    }
}
