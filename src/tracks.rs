//! Track table produced by an external object tracker, and camera motion
//! compensation of the positions it holds.
//!
//! The table is nested as category name → frame index → object id → record.
//! Only `position_adjusted` is ever written by this crate; every other field
//! of a record is carried through untouched.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::camera_motion::{CoordinateTransformation, MotionVector};
use crate::{Error, Result};

/// Object identifier assigned by the external tracker.
pub type ObjectId = u32;

/// Objects present in a single frame of one category.
pub type FrameObjects = BTreeMap<ObjectId, ObjectRecord>;

/// One tracked object in one frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Raw position in frame pixel coordinates, if the tracker produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 2]>,

    /// Position with the camera movement of its frame removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_adjusted: Option<[f64; 2]>,

    /// Any further fields (bbox, team, ...), preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ObjectRecord {
    /// Record with a raw position and no other fields.
    pub fn new(position: [f64; 2]) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }
}

/// Category name → per-frame list of objects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackTable {
    pub categories: BTreeMap<String, Vec<FrameObjects>>,
}

impl TrackTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a track table from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::SerializationError(e.to_string()))
    }

    /// Read a track table from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Serialize the table to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::SerializationError(e.to_string()))
    }

    /// Per-frame list for `category`, creating it if missing.
    pub fn category_mut(&mut self, category: &str) -> &mut Vec<FrameObjects> {
        self.categories.entry(category.to_string()).or_default()
    }

    /// Record of object `id` in `frame` of `category`, if present.
    pub fn get(&self, category: &str, frame: usize, id: ObjectId) -> Option<&ObjectRecord> {
        self.categories.get(category)?.get(frame)?.get(&id)
    }

    /// Total number of records over all categories and frames.
    pub fn num_records(&self) -> usize {
        self.categories
            .values()
            .flat_map(|frames| frames.iter())
            .map(|objects| objects.len())
            .sum()
    }
}

/// What [`adjust_positions`] did.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdjustmentSummary {
    /// Number of records whose `position_adjusted` was written.
    pub adjusted_records: usize,
    /// `(category, frame)` pairs that had no motion vector and were left alone.
    pub skipped_frames: Vec<(String, usize)>,
    /// Records in covered frames that carried no `position`.
    pub missing_positions: usize,
}

impl AdjustmentSummary {
    /// Whether every frame of the table had a motion vector.
    pub fn is_complete(&self) -> bool {
        self.skipped_frames.is_empty()
    }
}

/// Write `position_adjusted = position - movement[frame]` for every record.
///
/// Frames past the end of `movement` are skipped with a warning; earlier
/// frames are still adjusted. Records without a `position` are left as they
/// are. `position` is never modified, so calling this twice gives the same
/// table.
pub fn adjust_positions(tracks: &mut TrackTable, movement: &[MotionVector]) -> AdjustmentSummary {
    let mut summary = AdjustmentSummary::default();

    for (category, frames) in tracks.categories.iter_mut() {
        for (frame_num, objects) in frames.iter_mut().enumerate() {
            let Some(vector) = movement.get(frame_num) else {
                warn!(
                    category = %category,
                    frame_num,
                    num_vectors = movement.len(),
                    "frame is out of range for camera movement data"
                );
                summary.skipped_frames.push((category.clone(), frame_num));
                continue;
            };

            for (id, record) in objects.iter_mut() {
                let Some(position) = record.position else {
                    debug!(category = %category, frame_num, id, "record has no position");
                    summary.missing_positions += 1;
                    continue;
                };
                record.position_adjusted = Some(vector.rel_to_abs(position));
                summary.adjusted_records += 1;
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_table() -> TrackTable {
        let mut table = TrackTable::new();

        let players = table.category_mut("players");
        for frame in 0..3 {
            let mut objects = FrameObjects::new();
            objects.insert(1, ObjectRecord::new([100.0 + frame as f64, 200.0]));
            objects.insert(7, ObjectRecord::new([640.0, 360.0 - frame as f64]));
            players.push(objects);
        }

        let ball = table.category_mut("ball");
        let mut objects = FrameObjects::new();
        objects.insert(1, ObjectRecord::new([10.0, 20.0]));
        ball.push(objects);

        table
    }

    fn movement() -> Vec<MotionVector> {
        vec![
            MotionVector::ZERO,
            MotionVector::new(-8.0, 6.0),
            MotionVector::new(-8.0, 6.0),
        ]
    }

    #[test]
    fn test_adjust_positions() {
        let mut table = sample_table();
        let summary = adjust_positions(&mut table, &movement());

        assert_eq!(summary.adjusted_records, 7);
        assert!(summary.is_complete());

        let r = table.get("players", 1, 1).unwrap();
        assert_eq!(r.position, Some([101.0, 200.0]));
        let adjusted = r.position_adjusted.unwrap();
        assert_relative_eq!(adjusted[0], 109.0);
        assert_relative_eq!(adjusted[1], 194.0);

        let r = table.get("ball", 0, 1).unwrap();
        assert_eq!(r.position_adjusted, Some([10.0, 20.0]));
    }

    #[test]
    fn test_adjust_positions_idempotent() {
        let mut once = sample_table();
        adjust_positions(&mut once, &movement());

        let mut twice = once.clone();
        adjust_positions(&mut twice, &movement());

        assert_eq!(once, twice);
    }

    #[test]
    fn test_out_of_range_frames_skipped() {
        let mut table = sample_table();
        let summary = adjust_positions(&mut table, &movement()[..2]);

        assert_eq!(summary.skipped_frames, vec![("players".to_string(), 2)]);
        assert_eq!(summary.adjusted_records, 5);
        assert!(table.get("players", 1, 7).unwrap().position_adjusted.is_some());
        assert!(table.get("players", 2, 1).unwrap().position_adjusted.is_none());
        assert!(table.get("players", 2, 7).unwrap().position_adjusted.is_none());
    }

    #[test]
    fn test_empty_movement_skips_everything() {
        let mut table = sample_table();
        let before = table.clone();

        let summary = adjust_positions(&mut table, &[]);

        assert_eq!(summary.adjusted_records, 0);
        assert_eq!(summary.skipped_frames.len(), 4);
        assert_eq!(table, before);
    }

    #[test]
    fn test_extra_fields_preserved() {
        let json = r#"{
            "players": [
                { "3": { "position": [50.0, 60.0], "bbox": [40, 50, 60, 70], "team": 2 } }
            ]
        }"#;
        let mut table = TrackTable::from_json_str(json).unwrap();

        adjust_positions(&mut table, &[MotionVector::new(5.0, -5.0)]);

        let r = table.get("players", 0, 3).unwrap();
        assert_eq!(r.position, Some([50.0, 60.0]));
        assert_eq!(r.position_adjusted, Some([45.0, 65.0]));
        assert_eq!(r.extra["team"], serde_json::json!(2));
        assert_eq!(r.extra["bbox"], serde_json::json!([40, 50, 60, 70]));
        assert_eq!(r.extra.len(), 2);

        let reparsed = TrackTable::from_json_str(&table.to_json_string().unwrap()).unwrap();
        assert_eq!(reparsed, table);
    }

    #[test]
    fn test_record_without_position_left_untouched() {
        let json = r#"{ "referees": [ { "4": { "bbox": [1, 2, 3, 4] } } ] }"#;
        let mut table = TrackTable::from_json_str(json).unwrap();

        let summary = adjust_positions(&mut table, &[MotionVector::new(2.0, 3.0)]);

        assert_eq!(summary.adjusted_records, 0);
        assert_eq!(summary.missing_positions, 1);
        let r = table.get("referees", 0, 4).unwrap();
        assert_eq!(r.position, None);
        assert_eq!(r.position_adjusted, None);

        let out: serde_json::Value = serde_json::from_str(&table.to_json_string().unwrap()).unwrap();
        assert_eq!(out, serde_json::json!({ "referees": [ { "4": { "bbox": [1, 2, 3, 4] } } ] }));
    }

    #[test]
    fn test_num_records() {
        assert_eq!(sample_table().num_records(), 7);
        assert_eq!(TrackTable::new().num_records(), 0);
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            TrackTable::from_json_str("[1, 2"),
            Err(Error::SerializationError(_))
        ));
    }
}
