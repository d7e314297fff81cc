//! Polygon geometry helpers
//!
//! Bounding boxes, point-in-polygon tests, filled-polygon rasters and
//! masked pixel counting over binary activity masks.

use image::GrayImage;
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point as RasterPoint;

use crate::types::Point;

/// Axis-aligned bounding box over polygon vertices (inclusive coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl BoundingBox {
    /// Box covering all points. `None` for an empty vertex list.
    pub fn of_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &points[1..] {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        Some(bbox)
    }

    /// Grow the box by `margin` on every side
    pub fn expand(&self, margin: i32) -> Self {
        BoundingBox {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    /// Clip to image dimensions as a half-open pixel range
    /// `(x0, y0, x1, y1)`, matching a `[min, max)` crop. `None` when the
    /// clipped range is empty.
    pub fn clip(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = self.min_x.max(0) as u32;
        let y0 = self.min_y.max(0) as u32;
        let x1 = self.max_x.clamp(0, width as i32) as u32;
        let y1 = self.max_y.clamp(0, height as i32) as u32;
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0, y0, x1, y1))
    }
}

/// Polygon centroid as the integer average of its vertices
pub fn polygon_centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::new(0, 0);
    }
    let sx: i64 = points.iter().map(|p| p.x as i64).sum();
    let sy: i64 = points.iter().map(|p| p.y as i64).sum();
    let n = points.len() as i64;
    Point::new((sx / n) as i32, (sy / n) as i32)
}

fn edges(points: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = points.len();
    (0..n).map(move |i| (points[i], points[(i + 1) % n]))
}

fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (bx, by) = (b.x as f64, b.y as f64);
    let (dx, dy) = (bx - ax, by - ay);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }
    let t = (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0);
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

/// Distance from a point to the nearest polygon edge
pub fn distance_to_boundary(p: Point, points: &[Point]) -> f64 {
    edges(points)
        .map(|(a, b)| point_segment_distance(p, a, b))
        .fold(f64::INFINITY, f64::min)
}

/// Ray-casting polygon hit test. Points on the boundary count as inside.
pub fn point_in_polygon(p: Point, points: &[Point]) -> bool {
    if points.len() < 3 {
        return false;
    }
    if distance_to_boundary(p, points) < 1e-9 {
        return true;
    }
    let (px, py) = (p.x as f64, p.y as f64);
    let mut inside = false;
    for (a, b) in edges(points) {
        let (ax, ay) = (a.x as f64, a.y as f64);
        let (bx, by) = (b.x as f64, b.y as f64);
        if (ay > py) != (by > py) {
            let x_cross = ax + (py - ay) / (by - ay) * (bx - ax);
            if px < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

/// Signed distance to the polygon boundary: positive inside, negative
/// outside, zero on the boundary (pointPolygonTest semantics).
pub fn signed_distance(p: Point, points: &[Point]) -> f64 {
    let d = distance_to_boundary(p, points);
    if d < 1e-9 {
        return 0.0;
    }
    if point_in_polygon(p, points) {
        d
    } else {
        -d
    }
}

/// Rasterize the polygon interior as a filled binary mask of the given
/// dimensions. Degenerate polygons (< 3 vertices) produce an all-zero mask.
pub fn fill_mask(points: &[Point], width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    if points.len() < 3 {
        return mask;
    }
    let mut poly: Vec<RasterPoint<i32>> =
        points.iter().map(|p| RasterPoint::new(p.x, p.y)).collect();
    // draw_polygon_mut rejects an explicitly closed ring
    if poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
    draw_polygon_mut(&mut mask, &poly, image::Luma([255u8]));
    mask
}

/// Count active (nonzero) mask pixels inside the space polygon.
///
/// Rectangular spaces count the half-open bounding-box crop directly;
/// irregular ones additionally intersect the crop with the filled polygon
/// raster. The count is deterministic for identical inputs and bounded by
/// the polygon's pixel area.
pub fn count_active_pixels(mask: &GrayImage, points: &[Point], irregular: bool) -> u32 {
    let Some(bbox) = BoundingBox::of_points(points) else {
        return 0;
    };
    let Some((x0, y0, x1, y1)) = bbox.clip(mask.width(), mask.height()) else {
        return 0;
    };

    if !irregular {
        let mut count = 0;
        for y in y0..y1 {
            for x in x0..x1 {
                if mask.get_pixel(x, y)[0] != 0 {
                    count += 1;
                }
            }
        }
        return count;
    }

    // Rasterize in bbox-local coordinates to keep the scratch mask small.
    let local: Vec<Point> = points
        .iter()
        .map(|p| Point::new(p.x - bbox.min_x, p.y - bbox.min_y))
        .collect();
    let poly_mask = fill_mask(&local, (x1 - x0).max(1), (y1 - y0).max(1));

    let mut count = 0;
    for y in y0..y1 {
        for x in x0..x1 {
            if mask.get_pixel(x, y)[0] != 0 && poly_mask.get_pixel(x - x0, y - y0)[0] != 0 {
                count += 1;
            }
        }
    }
    count
}
