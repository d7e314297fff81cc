//! Segment-vs-occupied-space collision test
//!
//! An edge is blocked when any sample point along it lies inside an
//! occupied polygon or within the safety margin of its boundary. Every
//! overlapping polygon is tested exactly; bounding boxes only provide
//! fast rejection.

use lot_model::{signed_distance, BoundingBox, Point};
use occupancy::SpaceDetail;

/// Test whether the segment `a -> b` passes through or within `margin`
/// pixels of any occupied space. Samples every `step` pixels along the
/// segment, endpoints included.
pub fn segment_blocked(
    a: Point,
    b: Point,
    occupied: &[&SpaceDetail],
    step: f64,
    margin: f64,
) -> bool {
    if occupied.is_empty() {
        return false;
    }

    let length = a.distance(&b);
    if length == 0.0 {
        return false;
    }

    let num_checks = (length / step.max(1.0)) as usize + 2;
    let bbox_margin = margin.ceil() as i32;

    for space in occupied {
        let Some(bbox) = BoundingBox::of_points(&space.points) else {
            continue;
        };
        let bbox = bbox.expand(bbox_margin);

        for i in 0..num_checks {
            let t = i as f64 / (num_checks - 1) as f64;
            let sample = a.lerp(&b, t);

            if !bbox.contains(sample) {
                continue;
            }
            // Inside, or closer to the boundary than the margin
            if signed_distance(sample, &space.points) >= -margin {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use lot_model::SpaceStatus;

    fn occupied_square(x: i32, y: i32, size: i32) -> SpaceDetail {
        SpaceDetail {
            id: "1".into(),
            points: vec![
                Point::new(x, y),
                Point::new(x + size, y),
                Point::new(x + size, y + size),
                Point::new(x, y + size),
            ],
            status: SpaceStatus::Occupied,
            pixel_count: 0,
            irregular: false,
        }
    }

    #[test]
    fn test_segment_through_polygon_is_blocked() {
        let space = occupied_square(40, -10, 20);
        assert!(segment_blocked(
            Point::new(0, 0),
            Point::new(100, 0),
            &[&space],
            10.0,
            5.0
        ));
    }

    #[test]
    fn test_segment_clear_of_polygon_passes() {
        let space = occupied_square(40, 100, 20);
        assert!(!segment_blocked(
            Point::new(0, 0),
            Point::new(100, 0),
            &[&space],
            10.0,
            5.0
        ));
    }

    #[test]
    fn test_margin_blocks_near_misses() {
        // Segment passes 3 px above the polygon edge
        let space = occupied_square(40, 3, 20);
        let a = Point::new(0, 0);
        let b = Point::new(100, 0);
        assert!(segment_blocked(a, b, &[&space], 5.0, 5.0));
        assert!(!segment_blocked(a, b, &[&space], 5.0, 1.0));
    }

    #[test]
    fn test_all_overlapping_polygons_are_checked() {
        // First polygon's expanded bbox overlaps the segment but its exact
        // test stays clear; the second one actually straddles the segment.
        let clear = occupied_square(10, 1, 10);
        let hit = occupied_square(60, -5, 10);
        let occupied = [&clear, &hit];
        assert!(segment_blocked(
            Point::new(0, 0),
            Point::new(100, 0),
            &occupied,
            10.0,
            0.9
        ));
        assert!(!segment_blocked(
            Point::new(0, 0),
            Point::new(100, 0),
            &[&clear],
            10.0,
            0.9
        ));
    }

    #[test]
    fn test_zero_length_segment_never_blocks() {
        let space = occupied_square(-5, -5, 10);
        assert!(!segment_blocked(
            Point::new(0, 0),
            Point::new(0, 0),
            &[&space],
            10.0,
            5.0
        ));
    }
}
