//! Floor and ceiling: inverse perspective per pixel row.
//!
//! The eye sits at half the wall height, so the floor point seen `k` rows
//! below the horizon and the ceiling point `k` rows above it are the same
//! map position, at distance
//!
//! ```text
//! eye_height * viewplane / k
//! ```
//!
//! along the column's ray, with `k` measured from the horizon to the centre
//! of the row. Textures tile in map space, one texel per map unit.

use std::ops::Range;

use super::{Software, raycast::ColumnRay, raycast::fog};
use crate::world::{Texture, camera::Camera, shade};

impl Software {
    /// Fill every row of a column outside `wall` (unclipped slice rows,
    /// possibly empty): ceiling above the horizon, floor below it.
    ///
    /// Only a row whose centre sits exactly on the horizon (odd heights) is
    /// left alone; it would be infinitely far away.
    pub(super) fn draw_plane_column(
        &mut self,
        col: &ColumnRay,
        wall: Range<i64>,
        cam: &Camera,
        floor: &Texture,
        ceiling: &Texture,
    ) {
        let horizon = self.height as f64 * 0.5;
        let x = col.x as i64;

        for y in 0..self.height as i64 {
            if wall.contains(&y) {
                continue;
            }

            // negative above the horizon
            let k = y as f64 + 0.5 - horizon;
            if k == 0.0 {
                continue;
            }

            let distance = cam.eye_height() * col.viewplane / k.abs();
            let p = col.ray.point_at(distance);
            let (u, v) = (p.x.floor() as i64, p.y.floor() as i64);
            let tex = if k < 0.0 { ceiling } else { floor };

            self.put_pixel(x, y, shade(tex.texel(u, v), fog(distance, cam.far())));
        }
    }
}
