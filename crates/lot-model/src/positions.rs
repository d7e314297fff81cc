//! Positions file persistence
//!
//! The positions file stores the lot layout: parking space polygons and the
//! route waypoint skeleton. Two schemas are readable:
//!
//! - New schema: an object with `car_park_positions` and `route_points`.
//! - Old schema: a bare array of entries, each either a polygon
//!   (`[[x, y], ...]`) or a rectangle anchor (`[x, y]`). Identifiers are
//!   synthesized sequentially and the route list is empty.
//!
//! Writes always emit the new schema.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::types::{ParkingSpace, Point};

/// Rectangle dimensions used to upgrade old-schema anchor entries,
/// matching the editor's default stall size.
pub const LEGACY_RECT_WIDTH: i32 = 107;
pub const LEGACY_RECT_HEIGHT: i32 = 48;

/// Positions file error types
#[derive(Error, Debug)]
pub enum PositionsError {
    #[error("Positions file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read positions file: {0}")]
    Io(#[from] io::Error),

    #[error("Corrupt positions file: {0}")]
    Parse(String),
}

/// In-memory lot layout, canonical representation after load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotLayout {
    /// Parking spaces in authored order
    pub spaces: Vec<ParkingSpace>,

    /// Drivable path waypoints; the first element is the entry node
    pub route_points: Vec<Point>,
}

#[derive(Serialize, Deserialize)]
struct PositionsDoc {
    car_park_positions: Vec<ParkingSpace>,
    #[serde(default)]
    route_points: Vec<Point>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LegacyEntry {
    Polygon(Vec<Point>),
    Anchor(Point),
}

impl LotLayout {
    /// Load a layout, upgrading the old schema if present.
    ///
    /// A missing file is [`PositionsError::NotFound`]; content that parses
    /// as neither schema is [`PositionsError::Parse`] and must not be
    /// silently defaulted.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PositionsError> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PositionsError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let value: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| PositionsError::Parse(e.to_string()))?;

        let mut layout = match value {
            serde_json::Value::Object(_) => {
                let doc: PositionsDoc = serde_json::from_value(value)
                    .map_err(|e| PositionsError::Parse(e.to_string()))?;
                LotLayout {
                    spaces: doc.car_park_positions,
                    route_points: doc.route_points,
                }
            }
            serde_json::Value::Array(_) => {
                let entries: Vec<LegacyEntry> = serde_json::from_value(value)
                    .map_err(|e| PositionsError::Parse(e.to_string()))?;
                warn!(
                    path = %path.display(),
                    "loaded old positions schema, synthesizing ids and defaults"
                );
                Self::upgrade_legacy(entries)
            }
            _ => {
                return Err(PositionsError::Parse(
                    "expected a positions object or a legacy array".into(),
                ));
            }
        };

        layout.validate();
        info!(
            spaces = layout.spaces.len(),
            route_points = layout.route_points.len(),
            path = %path.display(),
            "loaded lot layout"
        );
        Ok(layout)
    }

    /// Load a layout, treating a missing file as an empty lot.
    ///
    /// Only absence is defaulted; a present-but-corrupt file still fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, PositionsError> {
        match Self::load(&path) {
            Ok(layout) => Ok(layout),
            Err(PositionsError::NotFound(p)) => {
                warn!(path = %p.display(), "positions file missing, starting with empty lot");
                Ok(LotLayout::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Save in the new schema
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PositionsError> {
        let doc = PositionsDoc {
            car_park_positions: self.spaces.clone(),
            route_points: self.route_points.clone(),
        };
        let raw = serde_json::to_string_pretty(&doc)
            .map_err(|e| PositionsError::Parse(e.to_string()))?;
        fs::write(path.as_ref(), raw)?;
        info!(
            spaces = self.spaces.len(),
            route_points = self.route_points.len(),
            path = %path.as_ref().display(),
            "saved lot layout"
        );
        Ok(())
    }

    fn upgrade_legacy(entries: Vec<LegacyEntry>) -> Self {
        let mut spaces = Vec::with_capacity(entries.len());
        for (i, entry) in entries.into_iter().enumerate() {
            let id = (i + 1).to_string();
            let space = match entry {
                LegacyEntry::Polygon(points) => {
                    let irregular = points.len() != 4;
                    ParkingSpace::new(id, points, irregular)
                }
                LegacyEntry::Anchor(p) => ParkingSpace::new(
                    id,
                    vec![
                        p,
                        Point::new(p.x + LEGACY_RECT_WIDTH, p.y),
                        Point::new(p.x + LEGACY_RECT_WIDTH, p.y + LEGACY_RECT_HEIGHT),
                        Point::new(p.x, p.y + LEGACY_RECT_HEIGHT),
                    ],
                    false,
                ),
            };
            spaces.push(space);
        }
        LotLayout {
            spaces,
            route_points: Vec::new(),
        }
    }

    /// Drop spaces that cannot participate in classification: fewer than
    /// three vertices, or an id already claimed by an earlier space.
    fn validate(&mut self) {
        let mut seen: HashSet<String> = HashSet::new();
        self.spaces.retain(|s| {
            if s.points.len() < 3 {
                warn!(id = %s.id, vertices = s.points.len(), "dropping degenerate space polygon");
                return false;
            }
            if !seen.insert(s.id.clone()) {
                warn!(id = %s.id, "dropping space with duplicate id");
                return false;
            }
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: i32, y: i32) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + 10, y),
            Point::new(x + 10, y + 10),
            Point::new(x, y + 10),
        ]
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("parksight-test-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_round_trip_preserves_ids_points_flags() {
        let layout = LotLayout {
            spaces: vec![
                ParkingSpace::new("2", rect(0, 0), false),
                ParkingSpace::new(
                    "1",
                    vec![Point::new(30, 0), Point::new(40, 0), Point::new(35, 12)],
                    true,
                ),
                ParkingSpace::new("exit-row", rect(50, 0), false),
            ],
            route_points: vec![Point::new(0, 50), Point::new(20, 50)],
        };

        let path = temp_path("roundtrip.json");
        layout.save(&path).unwrap();
        let back = LotLayout::load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(back, layout);
    }

    #[test]
    fn test_legacy_array_synthesizes_sequential_ids() {
        let path = temp_path("legacy.json");
        fs::write(
            &path,
            r#"[
                [[0, 0], [10, 0], [10, 10], [0, 10]],
                [[20, 0], [30, 0], [25, 12]],
                [100, 100]
            ]"#,
        )
        .unwrap();
        let layout = LotLayout::load(&path).unwrap();
        fs::remove_file(&path).ok();

        let ids: Vec<_> = layout.spaces.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert!(!layout.spaces[0].irregular);
        assert!(layout.spaces[1].irregular);
        assert!(layout.route_points.is_empty());

        // Anchor entry expands to the legacy rectangle
        let anchor = &layout.spaces[2];
        assert_eq!(anchor.points[0], Point::new(100, 100));
        assert_eq!(
            anchor.points[2],
            Point::new(100 + LEGACY_RECT_WIDTH, 100 + LEGACY_RECT_HEIGHT)
        );
    }

    #[test]
    fn test_missing_file_defaults_corrupt_fails() {
        let missing = temp_path("missing.json");
        assert!(matches!(
            LotLayout::load(&missing),
            Err(PositionsError::NotFound(_))
        ));
        assert_eq!(LotLayout::load_or_default(&missing).unwrap(), LotLayout::default());

        let corrupt = temp_path("corrupt.json");
        fs::write(&corrupt, "{ not json").unwrap();
        assert!(matches!(
            LotLayout::load_or_default(&corrupt),
            Err(PositionsError::Parse(_))
        ));
        fs::remove_file(&corrupt).ok();
    }

    #[test]
    fn test_validation_drops_degenerate_and_duplicate() {
        let path = temp_path("validate.json");
        let layout = LotLayout {
            spaces: vec![
                ParkingSpace::new("1", rect(0, 0), false),
                ParkingSpace::new("2", vec![Point::new(0, 0), Point::new(1, 1)], false),
                ParkingSpace::new("1", rect(20, 0), false),
            ],
            route_points: vec![],
        };
        layout.save(&path).unwrap();
        let back = LotLayout::load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(back.spaces.len(), 1);
        assert_eq!(back.spaces[0].id, "1");
        assert_eq!(back.spaces[0].points, rect(0, 0));
    }
}
