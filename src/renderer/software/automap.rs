//! Top-down map overlay.
//!
//! The whole map is scaled to fit the frame with a small margin. Walls some
//! ray has already hit are drawn bright, the others dim; the viewer is a
//! circle of its collision radius with two rays marking the field of view.

use super::Software;
use crate::{
    renderer::{Rgba, Scene},
    world::{Aabb, Segment, Vector, VectorExt},
};

const MARGIN: f64 = 8.0;
const SEEN_COLOR: Rgba = 0x00_E0E0E0;
const UNSEEN_COLOR: Rgba = 0x00_505050;
const PLAYER_COLOR: Rgba = 0x00_FFD000;
const FOV_COLOR: Rgba = 0x00_A08000;
/// Length of the field-of-view rays, map units.
const FOV_RAY_LEN: f64 = 48.0;

/// Map space → screen space: uniform scale, then offset.
#[derive(Clone, Copy, Debug)]
struct MapView {
    origin: Vector,
    scale: f64,
    offset: Vector,
}

impl MapView {
    /// Fit `bounds` into a `w × h` frame, centred, keeping the aspect ratio.
    fn fit(bounds: Aabb, w: usize, h: usize) -> Option<Self> {
        let room = Vector::new(w as f64, h as f64) - Vector::splat(2.0 * MARGIN);
        if room.x <= 0.0 || room.y <= 0.0 {
            return None;
        }

        // a single wall can have a zero-width box
        let size = bounds.size().max(Vector::ONE);
        let scale = (room.x / size.x).min(room.y / size.y);
        let offset = Vector::splat(MARGIN) + (room - size * scale) * 0.5;

        Some(Self {
            origin: bounds.min,
            scale,
            offset,
        })
    }

    #[inline]
    fn to_screen(&self, p: Vector) -> Vector {
        (p - self.origin) * self.scale + self.offset
    }

    #[inline]
    fn segment(&self, seg: &Segment) -> Segment {
        Segment::new(self.to_screen(seg.start), self.to_screen(seg.end))
    }
}

#[inline]
fn pixel(p: Vector) -> (i64, i64) {
    (p.x.round() as i64, p.y.round() as i64)
}

impl Software {
    pub(super) fn draw_map_overlay(&mut self, scene: &Scene) {
        // the viewer alone still gets a frame around it
        let bounds = scene
            .map
            .bounds()
            .unwrap_or_else(|| Aabb::new(scene.pov.pos, scene.pov.pos));
        let Some(view) = MapView::fit(bounds, self.width, self.height) else {
            return;
        };

        let screen = Aabb::new(
            Vector::ZERO,
            Vector::new(self.width as f64 - 1.0, self.height as f64 - 1.0),
        );

        for wall in scene.map.walls() {
            let color = if wall.seen() { SEEN_COLOR } else { UNSEEN_COLOR };
            self.draw_clipped(&screen, &view.segment(&wall.seg), color);
        }

        let pov = scene.pov;
        let eye = view.to_screen(pov.pos);
        let half_fov = scene.camera.fov() * 0.5;
        for angle in [-half_fov, half_fov] {
            let tip = pov.pos + pov.forward().rotated(angle) * FOV_RAY_LEN;
            self.draw_clipped(&screen, &Segment::new(eye, view.to_screen(tip)), FOV_COLOR);
        }

        let radius = (pov.radius * view.scale).round().max(1.0) as i64;
        self.draw_circle(pixel(eye), radius, PLAYER_COLOR);
    }

    /// Draw the part of `seg` (screen space) inside `screen`, if any.
    fn draw_clipped(&mut self, screen: &Aabb, seg: &Segment, color: Rgba) {
        if let Some(seg) = screen.clip_segment(seg) {
            self.draw_line(pixel(seg.start), pixel(seg.end), color);
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
