//! Swept circle-vs-wall collision and slide response.
//!
//! A [`Mobile`] sweeps its centre along `pos + t * vel`, `t` in `[0, 1]`
//! (one tic). For every wall we look for the first `t` at which the circle
//! touches it, either somewhere along its interior or at one of its two
//! vertices, and keep the *earliest* contact over the whole map.
//!
//! ```text
//!                                   end
//!        .-----.        /          +
//!      .'      ^'.     /          /
//!     /      r/   \   /          /
//!    |       +-----\-+----------/-----> vel
//!     \     O   '·./ I'        / I
//!      '·_______·/            /
//!                            +  start
//! ```
//!
//! Interior: the gap between the centre and the wall's support line shrinks
//! at `|vel · n|` per tic, so contact happens at
//! `t0 = (gap - r) / |vel · n|`; the touching point is the swept centre
//! pushed `r` towards the wall, and it must land on the finite segment.
//!
//! Vertex: the centre closes in on a point `p` at `vel · unit(p - O)`, so
//! `t0 = (|p - O| - r) / (vel · unit(p - O))`.

use crate::sim::Mobile;
use crate::world::geometry::{EPSILON, Segment, Vector, VectorExt, is_zero};
use crate::world::{Map, WallId};

/// Detect-and-slide passes per tic. Whatever is left after the last pass is
/// dropped.
pub const MAX_SLIDE_DEPTH: usize = 3;

/// Fraction of the tic's velocity we stop short of a contact, so the next
/// pass does not find the same wall at `t0 = 0` again.
pub const STAND_OFF: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactKind {
    /// Somewhere strictly along the wall.
    Interior,
    /// One of the wall's endpoints.
    Vertex,
}

/// First touch between a sweeping circle and a single obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub point: Vector,
    /// Fraction of the sweep at which the circle touches, `[0, 1]`.
    pub t0: f64,
    /// From the sweep start to `point`.
    pub distance: f64,
    pub kind: ContactKind,
}

/// What [`check_collision`] found.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collision {
    /// The mobile as it was at the start of the sweep.
    pub mob: Mobile,
    pub point: Vector,
    pub wall: WallId,
    pub t0: f64,
    pub distance: f64,
    pub kind: ContactKind,
}

/* ─────────────────────────  DETECTION  ───────────────────────────────── */

/// When (if at all this tic) does `mob` touch point `p`?
///
/// Only points the mobile is closing in on count; a centre sitting on `p`
/// never collides with it.
pub fn check_point(p: Vector, mob: &Mobile) -> Option<Contact> {
    let to_p = p - mob.pos;
    let distance = to_p.length();
    let closing = mob.vel.dot(to_p.unit_or_zero());
    if closing <= EPSILON {
        return None;
    }

    let t0 = (distance - mob.radius) / closing;
    (0.0..=1.0).contains(&t0).then_some(Contact {
        point: p,
        t0,
        distance,
        kind: ContactKind::Vertex,
    })
}

/// Earliest contact between `mob` (moving at `speed = |vel|`) and `seg`.
pub fn check_segment(seg: &Segment, mob: &Mobile, speed: f64) -> Option<Contact> {
    let line = seg.support_line();
    let gap = line.distance_to_point(mob.pos);

    // cannot reach the support line this tic
    if gap > speed + mob.radius {
        return None;
    }

    let parallel = mob.vel.is_parallel(line.dir);
    // sliding alongside a wall we already clear
    if parallel && gap > mob.radius {
        return None;
    }

    if !parallel {
        if let Some(hit) = interior_contact(seg, mob, gap) {
            return Some(hit);
        }
    }

    [seg.start, seg.end]
        .into_iter()
        .filter_map(|p| check_point(p, mob))
        .min_by(|a, b| a.t0.total_cmp(&b.t0))
}

fn interior_contact(seg: &Segment, mob: &Mobile, gap: f64) -> Option<Contact> {
    let line = seg.support_line();
    let normal = line.normal();
    let side = line.side(mob.pos) as f64;

    // positive while the centre moves towards the line
    let closing = -side * mob.vel.dot(normal);
    if closing <= EPSILON {
        return None;
    }

    let t0 = (gap - mob.radius) / closing;
    if !(0.0..=1.0).contains(&t0) {
        return None;
    }

    let point = mob.pos + mob.vel * t0 - normal * (side * mob.radius);
    seg.contains_point(point).then(|| Contact {
        point,
        t0,
        distance: mob.pos.distance(point),
        kind: ContactKind::Interior,
    })
}

/// Earliest contact between `mob`'s sweep and any wall of `map`.
///
/// Ties go to the wall listed first. A mobile with (near) zero velocity
/// never collides.
pub fn check_collision(map: &Map, mob: &Mobile) -> Option<Collision> {
    let speed = mob.vel.length();
    if is_zero(speed) {
        return None;
    }

    map.walls()
        .iter()
        .enumerate()
        .filter_map(|(id, wall)| check_segment(&wall.seg, mob, speed).map(|c| (id, c)))
        .min_by(|(_, a), (_, b)| a.t0.total_cmp(&b.t0))
        .map(|(wall, c)| Collision {
            mob: *mob,
            point: c.point,
            wall,
            t0: c.t0,
            distance: c.distance,
            kind: c.kind,
        })
}

/* ─────────────────────────  RESPONSE  ────────────────────────────────── */

/// One detect-and-slide pass.
///
/// * no velocity: nothing happens;
/// * free path: the whole velocity is applied and zeroed;
/// * contact: the mobile stops just short of it and keeps the unused part
///   of its velocity projected on the tangent at the contact point.
pub fn move_once(map: &Map, mut mob: Mobile) -> (Mobile, Option<Collision>) {
    if !mob.is_moving() {
        return (mob, None);
    }

    let Some(hit) = check_collision(map, &mob) else {
        mob.pos += mob.vel;
        mob.vel = Vector::ZERO;
        return (mob, None);
    };

    log::trace!(
        "hit wall {} ({:?}) at {:?}, t0 = {:.3}",
        hit.wall,
        hit.kind,
        hit.point,
        hit.t0
    );

    mob.pos += mob.vel * (hit.t0 - STAND_OFF);
    let remaining = mob.vel * (1.0 - hit.t0);
    let tangent = (hit.point - mob.pos).perp();
    mob.vel = remaining.project(tangent);

    (mob, Some(hit))
}

/// Move `mob` through `map` for one tic, sliding along whatever it bumps
/// into. At most [`MAX_SLIDE_DEPTH`] passes are made; the map is untouched.
pub fn move_mobile(map: &Map, mut mob: Mobile) -> Mobile {
    for _ in 0..MAX_SLIDE_DEPTH {
        let (next, hit) = move_once(map, mob);
        mob = next;
        if hit.is_none() {
            break;
        }
    }
    mob
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
