//! ---------------------------------------------------------------------------
//! Classic software (CPU) raycaster
//!
//! * Fills an owned frame-buffer in **0x00RRGGBB** format, row-major.
//! * One ray per screen column, nearest wall wins; no Z-buffer needed.
//! * Every pixel write goes through [`Software::put_pixel`], which drops
//!   anything outside the buffer.
//! ---------------------------------------------------------------------------

mod automap;
mod planes;
mod raycast;

pub use raycast::{RayHit, cast_ray, column_height};

use crate::{
    renderer::{Renderer, Rgba, Scene},
    world::TextureBank,
};

/// Colour of pixels nothing was drawn into (the horizon of open maps).
pub const CLEAR_COLOR: Rgba = 0x00_202020;

/*───────────────────────────────────────────────────────────────────────*/
/*                              Backend                                 */
/*───────────────────────────────────────────────────────────────────────*/

#[derive(Default)]
pub struct Software {
    scratch: Vec<Rgba>,
    width: usize,
    height: usize,
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize) {
        // (re)allocate if resolution changed
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
            self.scratch.resize(w * h, 0);
        }
        self.scratch.fill(CLEAR_COLOR);
    }

    fn draw_scene(&mut self, scene: &Scene, bank: &TextureBank) {
        self.draw_view(scene, bank);
    }

    fn draw_automap(&mut self, scene: &Scene) {
        self.draw_map_overlay(scene);
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        submit(&self.scratch, self.width, self.height);
    }
}

/*──────────────────────── pixel access ───────────────────────────────*/

impl Software {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The last frame drawn (or being drawn).
    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.scratch
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.scratch[y * self.width + x])
    }

    /// Write one pixel; coordinates outside the buffer are ignored.
    #[inline(always)]
    pub fn put_pixel(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        self.scratch[y as usize * self.width + x as usize] = color;
    }

    /// Doom's Bresenham: integer-only, both endpoints inclusive.
    pub fn draw_line(&mut self, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Rgba) {
        let dx = x1 - x0;
        let ax = 2 * dx.abs();
        let sx = if dx < 0 { -1 } else { 1 };

        let dy = y1 - y0;
        let ay = 2 * dy.abs();
        let sy = if dy < 0 { -1 } else { 1 };

        let (mut x, mut y) = (x0, y0);

        if ax > ay {
            let mut d = ay - ax / 2;
            loop {
                self.put_pixel(x, y, color);
                if x == x1 {
                    return;
                }
                if d >= 0 {
                    y += sy;
                    d -= ax;
                }
                x += sx;
                d += ay;
            }
        } else {
            let mut d = ax - ay / 2;
            loop {
                self.put_pixel(x, y, color);
                if y == y1 {
                    return;
                }
                if d >= 0 {
                    x += sx;
                    d -= ay;
                }
                y += sy;
                d += ax;
            }
        }
    }

    /// Midpoint circle outline centred on (`cx`, `cy`).
    pub fn draw_circle(&mut self, (cx, cy): (i64, i64), radius: i64, color: Rgba) {
        let mut x = radius;
        let mut y = 0;
        let mut decision = 1 - x;

        while x >= y {
            for (px, py) in [
                (x, y),
                (y, x),
                (-x, y),
                (-y, x),
                (-x, -y),
                (-y, -x),
                (x, -y),
                (y, -x),
            ] {
                self.put_pixel(cx + px, cy + py, color);
            }
            y += 1;

            if decision <= 0 {
                decision += 2 * y + 1;
            } else {
                x -= 1;
                decision += 2 * (y - x) + 1;
            }
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
