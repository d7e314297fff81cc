//! Drawing primitives and the annotator itself

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, draw_text_mut,
};
use imageproc::rect::Rect;

use lot_model::{polygon_centroid, Point, SpaceStatus};
use occupancy::{FrameStats, SpaceDetail};
use route_plan::PlannedRoute;

/// Annotation style. Colors and sizes mirror the reference overlay; a
/// font is optional and text (labels, panel lines) is skipped without one.
#[derive(Debug, Clone)]
pub struct AnnotatorStyle {
    pub empty_color: Rgb<u8>,
    pub empty_irregular_color: Rgb<u8>,
    pub occupied_color: Rgb<u8>,
    pub route_color: Rgb<u8>,
    pub panel_color: Rgb<u8>,
    pub text_color: Rgb<u8>,

    /// Outline thickness for empty spaces (px)
    pub empty_thickness: u32,

    /// Outline thickness for occupied spaces (px)
    pub occupied_thickness: u32,

    /// Route polyline thickness (px)
    pub route_thickness: u32,

    /// Arrowhead wing length (px)
    pub arrow_length: f32,

    /// Target marker radius (px)
    pub target_radius: i32,

    /// Label font; `None` disables all text
    pub font: Option<FontArc>,

    /// Label font scale (px)
    pub label_scale: f32,
}

impl Default for AnnotatorStyle {
    fn default() -> Self {
        Self {
            empty_color: Rgb([0, 255, 0]),
            empty_irregular_color: Rgb([0, 255, 128]),
            occupied_color: Rgb([255, 0, 0]),
            route_color: Rgb([0, 255, 255]),
            panel_color: Rgb([180, 0, 180]),
            text_color: Rgb([255, 255, 255]),
            empty_thickness: 5,
            occupied_thickness: 2,
            route_thickness: 4,
            arrow_length: 20.0,
            target_radius: 20,
            font: None,
            label_scale: 18.0,
        }
    }
}

/// Frame annotator. Stateless apart from its style; draws onto the frame
/// it is given and has no other side effects.
pub struct Annotator {
    style: AnnotatorStyle,
}

impl Annotator {
    pub fn new(style: AnnotatorStyle) -> Self {
        Self { style }
    }

    /// Render the per-frame results onto `frame`. A `None` route simply
    /// omits the route overlay.
    pub fn annotate(&self, frame: &mut RgbImage, stats: &FrameStats, route: Option<&PlannedRoute>) {
        for space in &stats.spaces {
            self.draw_space(frame, space);
        }
        self.draw_info_panel(frame, stats);
        if let Some(route) = route {
            self.draw_route(frame, route);
        }
    }

    fn draw_space(&self, frame: &mut RgbImage, space: &SpaceDetail) {
        let (color, thickness) = match space.status {
            SpaceStatus::Empty if space.irregular => {
                (self.style.empty_irregular_color, self.style.empty_thickness)
            }
            SpaceStatus::Empty => (self.style.empty_color, self.style.empty_thickness),
            SpaceStatus::Occupied => (self.style.occupied_color, self.style.occupied_thickness),
        };

        let n = space.points.len();
        for i in 0..n {
            let a = space.points[i];
            let b = space.points[(i + 1) % n];
            draw_thick_line(frame, a, b, thickness, color);
        }

        if let Some(font) = &self.style.font {
            let center = polygon_centroid(&space.points);
            draw_text_mut(
                frame,
                self.style.text_color,
                center.x - 10,
                center.y - (self.style.label_scale / 2.0) as i32,
                PxScale::from(self.style.label_scale),
                font,
                &space.id,
            );
        }
    }

    fn draw_info_panel(&self, frame: &mut RgbImage, stats: &FrameStats) {
        if frame.width() < 300 || frame.height() < 85 {
            return;
        }
        draw_filled_rect_mut(
            frame,
            Rect::at(45, 30).of_size(255, 55),
            self.style.panel_color,
        );
        if let Some(font) = &self.style.font {
            let free = format!("Free: {}/{}", stats.empty_count, stats.total_count);
            let rate = format!("Occupancy: {:.1}%", stats.occupancy_rate_percent);
            draw_text_mut(
                frame,
                self.style.text_color,
                50,
                40,
                PxScale::from(self.style.label_scale),
                font,
                &free,
            );
            draw_text_mut(
                frame,
                self.style.text_color,
                50,
                62,
                PxScale::from(self.style.label_scale * 0.8),
                font,
                &rate,
            );
        }
    }

    fn draw_route(&self, frame: &mut RgbImage, route: &PlannedRoute) {
        for pair in route.points.windows(2) {
            draw_thick_line(frame, pair[0], pair[1], self.style.route_thickness, self.style.route_color);
            self.draw_arrowhead(frame, pair[0], pair[1]);
        }
        draw_filled_circle_mut(
            frame,
            (route.target.x, route.target.y),
            self.style.target_radius,
            self.style.route_color,
        );
    }

    /// Arrow wings at the segment tip, +-30 degrees off the direction
    fn draw_arrowhead(&self, frame: &mut RgbImage, from: Point, to: Point) {
        let dx = (to.x - from.x) as f32;
        let dy = (to.y - from.y) as f32;
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let angle = dy.atan2(dx);
        let len = self.style.arrow_length;
        for wing in [angle - std::f32::consts::FRAC_PI_6, angle + std::f32::consts::FRAC_PI_6] {
            let wing_end = Point::new(
                (to.x as f32 - len * wing.cos()) as i32,
                (to.y as f32 - len * wing.sin()) as i32,
            );
            draw_thick_line(frame, to, wing_end, 3, self.style.route_color);
        }
    }
}

/// Approximate a thick line with parallel 1 px lines offset along the
/// perpendicular.
fn draw_thick_line(frame: &mut RgbImage, a: Point, b: Point, thickness: u32, color: Rgb<u8>) {
    let dx = (b.x - a.x) as f32;
    let dy = (b.y - a.y) as f32;
    let len = (dx * dx + dy * dy).sqrt();
    let (nx, ny) = if len == 0.0 { (0.0, 0.0) } else { (-dy / len, dx / len) };

    let half = thickness.max(1) as i32 / 2;
    for i in -half..=half {
        let ox = (nx * i as f32).round();
        let oy = (ny * i as f32).round();
        draw_line_segment_mut(
            frame,
            (a.x as f32 + ox, a.y as f32 + oy),
            (b.x as f32 + ox, b.y as f32 + oy),
            color,
        );
    }
}
