//! Core model types

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// 2D integer image coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation between two points, t in [0, 1]
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point {
            x: (self.x as f64 * (1.0 - t) + other.x as f64 * t) as i32,
            y: (self.y as f64 * (1.0 - t) + other.y as f64 * t) as i32,
        }
    }
}

// Points persist as `[x, y]` pairs to match the positions file layout.
impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.x, self.y).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (x, y) = <(i32, i32)>::deserialize(deserializer)?;
        Ok(Point { x, y })
    }
}

/// Occupancy status of one parking space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpaceStatus {
    #[default]
    Empty,
    Occupied,
}

impl SpaceStatus {
    pub fn is_empty(&self) -> bool {
        matches!(self, SpaceStatus::Empty)
    }
}

/// One annotated parking space
///
/// Authored by the external editor, persisted in the positions file and
/// never mutated by the pipeline at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingSpace {
    /// Stable identifier, unique within one lot. Usually numeric
    /// ("1", "2", ...) but free-form ids are allowed.
    pub id: String,

    /// Polygon vertices in draw order. 4 for rectangular spaces,
    /// N >= 3 for irregular ones.
    pub points: Vec<Point>,

    /// Irregular (non-rectangular) polygon flag
    #[serde(default)]
    pub irregular: bool,
}

impl ParkingSpace {
    pub fn new(id: impl Into<String>, points: Vec<Point>, irregular: bool) -> Self {
        Self {
            id: id.into(),
            points,
            irregular,
        }
    }

    /// Numeric sort key. Non-numeric ids yield `None` and order last.
    pub fn sort_key(&self) -> Option<i64> {
        self.id.parse::<i64>().ok()
    }
}

/// Sort spaces into the canonical classification order: numeric ids
/// ascending first, non-numeric ids after them in their input order.
///
/// The sort is stable, so ties (including all non-numeric ids, which
/// compare equal to each other) preserve the original order.
pub fn sort_spaces(spaces: &mut [ParkingSpace]) {
    spaces.sort_by_key(|s| match s.sort_key() {
        Some(n) => (false, n),
        None => (true, 0),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(id: &str) -> ParkingSpace {
        ParkingSpace::new(id, vec![Point::new(0, 0), Point::new(1, 0), Point::new(1, 1)], true)
    }

    #[test]
    fn test_numeric_ids_sort_ascending_non_numeric_last() {
        let mut spaces: Vec<_> = ["10", "2", "a", "1"].iter().map(|id| space(id)).collect();
        sort_spaces(&mut spaces);
        let order: Vec<_> = spaces.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, ["1", "2", "10", "a"]);
    }

    #[test]
    fn test_non_numeric_ids_keep_input_order() {
        let mut spaces: Vec<_> = ["b", "3", "a", "c"].iter().map(|id| space(id)).collect();
        sort_spaces(&mut spaces);
        let order: Vec<_> = spaces.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, ["3", "b", "a", "c"]);
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert!((a.distance(&b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_serializes_as_pair() {
        let json = serde_json::to_string(&Point::new(7, -2)).unwrap();
        assert_eq!(json, "[7,-2]");
        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Point::new(7, -2));
    }
}
