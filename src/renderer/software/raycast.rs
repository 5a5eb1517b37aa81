//! Per-column ray casting and wall slices.
//!
//! ```text
//!              wall
//!   ───────────●──────────
//!               \  d (along the ray)
//!                \
//!   ──────────────+──── view plane, `vd / cos(a)` along the ray
//!                  \ a
//!                   O  viewer
//! ```
//!
//! Column height is `(vd / cos a) * WALL_HEIGHT / d`: the ray length is
//! divided by the same `cos a` as the view-plane distance, which cancels the
//! fish-eye bulge.

use std::ops::Range;

use super::Software;
use crate::{
    renderer::Scene,
    world::{
        Map, Ray, Texture, TextureBank, Vector, VectorExt, WallId, camera::Camera, shade,
    },
};

/// Closest wall along a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub wall: WallId,
    pub point: Vector,
    /// From the ray origin, in units of `ray.dir`.
    pub distance: f64,
}

/// Nearest wall crossed by `ray` strictly beyond `near`.
///
/// Walls parallel to the ray are never hit. Equal distances keep the wall
/// listed first.
pub fn cast_ray(map: &Map, ray: &Ray, near: f64) -> Option<RayHit> {
    let len = ray.dir.length();
    map.walls()
        .iter()
        .enumerate()
        .filter_map(|(wall, w)| {
            let point = w.seg.ray_intersection(ray)?;
            let distance = ray.start.distance(point) / len;
            (distance > near).then_some(RayHit {
                wall,
                point,
                distance,
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Projected height, in pixels, of a wall `distance` away, rounded up to an
/// even count so the slice splits evenly around the horizon.
#[inline]
pub fn column_height(viewplane: f64, wall_height: f64, distance: f64) -> usize {
    let h = (viewplane * wall_height / distance).ceil();
    // saturating float→int cast; huge heights only happen right at a wall
    let h = h as usize;
    h + (h & 1)
}

/// Colour attenuation for something `distance` away: full brightness up to
/// `far`, then `far / distance`.
#[inline]
pub(super) fn fog(distance: f64, far: f64) -> f64 {
    if distance > far { far / distance } else { 1.0 }
}

/// Everything one column needs about its ray.
#[derive(Clone, Copy, Debug)]
pub(super) struct ColumnRay {
    pub x: usize,
    pub ray: Ray,
    /// View-plane distance measured along this ray.
    pub viewplane: f64,
}

impl Software {
    /// Cast one ray per column, draw the wall slice it hits and fill the
    /// rest of the column with floor and ceiling.
    pub(super) fn draw_view(&mut self, scene: &Scene, bank: &TextureBank) {
        let cam = scene.camera;
        let vd = cam.viewplane_distance(self.width);
        let wall_tex = bank.texture_or_missing(scene.textures.wall);
        let floor_tex = bank.texture_or_missing(scene.textures.floor);
        let ceil_tex = bank.texture_or_missing(scene.textures.ceiling);

        for x in 0..self.width {
            let angle = cam.ray_angle(x, self.width);
            let cos = angle.cos();
            let col = ColumnRay {
                x,
                ray: Ray::new(scene.pov.pos, scene.pov.forward().rotated(angle)),
                viewplane: vd / cos,
            };

            let rows = match cast_ray(scene.map, &col.ray, cam.near() / cos) {
                Some(hit) => {
                    if let Some(wall) = scene.map.wall(hit.wall) {
                        wall.mark_seen();
                    }
                    self.draw_wall_column(&col, &hit, scene, cam, wall_tex)
                }
                None => 0..0,
            };

            self.draw_plane_column(&col, rows, cam, floor_tex, ceil_tex);
        }
    }

    /// Draw the slice for `hit`; returns the rows it spans, unclipped.
    fn draw_wall_column(
        &mut self,
        col: &ColumnRay,
        hit: &RayHit,
        scene: &Scene,
        cam: &Camera,
        tex: &Texture,
    ) -> Range<i64> {
        let h = column_height(col.viewplane, cam.wall_height(), hit.distance);
        if h == 0 {
            return 0..0;
        }

        let top = (self.height as i64 - h as i64) / 2;
        let y0 = top.max(0);
        let y1 = (top + h as i64).min(self.height as i64);

        // texture column: distance along the wall from its start vertex
        let u = scene
            .map
            .wall(hit.wall)
            .map_or(0.0, |w| w.seg.start.distance(hit.point)) as i64;
        let k = fog(hit.distance, cam.far());
        let (tex_h, h) = (tex.h as i64, h as i64);

        for y in y0..y1 {
            let v = tex_h * (y - top) / h;
            self.put_pixel(col.x as i64, y, shade(tex.texel(u, v), k));
        }

        top..top + h
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        renderer::{Renderer, RendererExt, SceneTextures, software::CLEAR_COLOR},
        mapfile::parse_map,
        sim::Mobile,
        world::{Segment, map::square_room},
    };

    const RED: u32 = 0x00_FF0000;
    const GREEN: u32 = 0x00_00FF00;
    const BLUE: u32 = 0x00_0000FF;
    const W: usize = 64;
    const H: usize = 48;

    fn bank() -> (TextureBank, SceneTextures) {
        let mut bank = TextureBank::default_with_checker();
        let mut solid = |name: &str, c| {
            bank.insert(name, Texture::new(name, 1, 1, vec![c]).unwrap())
                .unwrap()
        };
        let textures = SceneTextures {
            wall: solid("WALL", RED),
            floor: solid("FLOOR", GREEN),
            ceiling: solid("CEIL", BLUE),
        };
        (bank, textures)
    }

    fn render(map: &Map, pov: &Mobile, cam: &Camera) -> Software {
        render_sized(map, pov, cam, W, H)
    }

    fn render_sized(map: &Map, pov: &Mobile, cam: &Camera, w: usize, h: usize) -> Software {
        let (bank, textures) = bank();
        let scene = Scene {
            pov,
            map,
            camera: cam,
            textures,
        };
        let mut sw = Software::default();
        sw.draw_frame(w, h, &scene, &bank, false, |_, _, _| {});
        sw
    }

    #[test]
    fn axis_rays_hit_square_room_at_five() {
        let map = parse_map(
            "# top, right, bottom, left\n\
             -5 -5 5 -5\n\
             5 -5 5 5\n\
             5 5 -5 5\n\
             -5 5 -5 -5\n",
        )
        .unwrap();
        assert_eq!(map.len(), 4);
        let expect = [
            (Vector::NEG_Y, 0, Vector::new(0.0, -5.0)),
            (Vector::X, 1, Vector::new(5.0, 0.0)),
            (Vector::Y, 2, Vector::new(0.0, 5.0)),
            (Vector::NEG_X, 3, Vector::new(-5.0, 0.0)),
        ];
        for (dir, wall, point) in expect {
            let hit = cast_ray(&map, &Ray::new(Vector::ZERO, dir), 1.0).unwrap();
            assert_eq!(hit.wall, wall, "{dir:?}");
            assert!(hit.point.approx_eq(point));
            assert!((hit.distance - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn nearest_wall_wins_and_near_clip_skips() {
        let map = Map::from_segments([
            Segment::new(Vector::new(8.0, -1.0), Vector::new(8.0, 1.0)),
            Segment::new(Vector::new(3.0, -1.0), Vector::new(3.0, 1.0)),
            Segment::new(Vector::new(0.5, -1.0), Vector::new(0.5, 1.0)),
        ]);
        let ray = Ray::new(Vector::ZERO, Vector::X);
        assert_eq!(cast_ray(&map, &ray, 1.0).unwrap().wall, 1);
        assert_eq!(cast_ray(&map, &ray, 0.1).unwrap().wall, 2);
        assert_eq!(cast_ray(&map, &ray, 10.0), None);
        // parallel
        let along = Ray::new(Vector::new(0.0, 5.0), Vector::Y);
        assert_eq!(cast_ray(&map, &along, 0.0), None);
    }

    #[test]
    fn column_heights_are_even_and_rounded_up() {
        assert_eq!(column_height(100.0, 64.0, 100.0), 64);
        assert_eq!(column_height(100.0, 64.0, 150.0), 44); // 42.67
        assert_eq!(column_height(100.0, 64.0, 320.0), 20);
        assert_eq!(column_height(10.0, 64.0, 1e9), 2);
        assert_eq!(column_height(100.0, 64.0, f64::INFINITY), 0);
    }

    #[test]
    fn fog_only_darkens_past_far() {
        assert_eq!(fog(10.0, 300.0), 1.0);
        assert_eq!(fog(600.0, 300.0), 0.5);
    }

    #[test]
    fn square_room_frame() {
        let map = square_room(400.0);
        let pov = Mobile::new(Vector::ZERO, Vector::X, 8.0);
        let sw = render(&map, &pov, &Camera::default());

        let mid = W / 2;
        assert_eq!(sw.pixel(mid, H / 2), Some(RED));
        assert_eq!(sw.pixel(mid, 0), Some(BLUE));
        assert_eq!(sw.pixel(mid, H - 1), Some(GREEN));
        // a 75° view from the centre only reaches the wall ahead
        assert!(map.walls()[1].seen());
        assert_eq!(map.seen_count(), 1);
    }

    #[test]
    fn slices_are_symmetric_about_horizon() {
        let map = square_room(400.0);
        let pov = Mobile::new(Vector::ZERO, Vector::X, 8.0);
        let sw = render(&map, &pov, &Camera::default());

        let column: Vec<_> = (0..H).map(|y| sw.pixel(W / 2, y).unwrap()).collect();
        let first = column.iter().position(|&c| c == RED).unwrap();
        let last = column.iter().rposition(|&c| c == RED).unwrap();
        assert_eq!(first, H - 1 - last);
        assert_eq!((last - first + 1) % 2, 0);
    }

    #[test]
    fn distant_walls_fade() {
        let map = square_room(400.0);
        let pov = Mobile::new(Vector::ZERO, Vector::X, 8.0);
        let cam = Camera::default().with_clip(1.0, 50.0);
        let sw = render(&map, &pov, &cam);
        // 200 away with far = 50: a quarter of the brightness
        assert_eq!(sw.pixel(W / 2, H / 2), Some(0x00_3F0000));
    }

    #[test]
    fn wall_taller_than_screen_is_clipped() {
        let map = square_room(400.0);
        let pov = Mobile::new(Vector::new(195.0, 0.0), Vector::X, 8.0);
        let sw = render(&map, &pov, &Camera::default());
        assert!((0..H).all(|y| sw.pixel(W / 2, y) == Some(RED)));
    }

    #[test]
    fn open_map_gets_floor_and_ceiling_only() {
        let map = Map::default();
        let pov = Mobile::new(Vector::ZERO, Vector::X, 8.0);
        let sw = render(&map, &pov, &Camera::default());

        assert!(!sw.pixels().contains(&RED));
        assert!(!sw.pixels().contains(&CLEAR_COLOR));
        for x in [0, W / 2, W - 1] {
            assert_eq!(sw.pixel(x, 0), Some(BLUE));
            assert_eq!(sw.pixel(x, H - 1), Some(GREEN));
        }

        // odd height: the row centred on the horizon is the only gap
        let sw = render_sized(&map, &pov, &Camera::default(), W, H + 1);
        for y in 0..=H {
            let clear = (0..W).all(|x| sw.pixel(x, y) == Some(CLEAR_COLOR));
            assert_eq!(clear, y == H / 2, "row {y}");
        }
    }

    #[test]
    fn closed_room_leaves_no_pixel_unpainted() {
        let map = square_room(400.0);
        let pov = Mobile::new(Vector::ZERO, Vector::X, 8.0);
        for h in [H, H + 1] {
            let sw = render_sized(&map, &pov, &Camera::default(), W, h);
            assert!(!sw.pixels().contains(&CLEAR_COLOR), "height {h}");
        }
    }

    #[test]
    fn tiny_and_empty_viewports() {
        let map = square_room(10.0);
        let pov = Mobile::new(Vector::ZERO, Vector::X, 1.0);
        let (bank, textures) = bank();
        let cam = Camera::default();
        let scene = Scene {
            pov: &pov,
            map: &map,
            camera: &cam,
            textures,
        };
        let mut sw = Software::default();
        for (w, h) in [(0, 0), (1, 1), (1, 3), (5, 0)] {
            sw.begin_frame(w, h);
            sw.draw_scene(&scene, &bank);
            assert_eq!(sw.pixels().len(), w * h);
        }
    }
}
