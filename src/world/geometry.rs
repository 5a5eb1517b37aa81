//! 2-D math kernel shared by the renderer and the collision code.
//!
//! Everything works in *screen* coordinates: x grows to the right and
//! y grows downwards, so a positive angle turns **clockwise**.
//!
//! ```text
//!   o-----> x
//!   |
//!   v y
//! ```
//!
//! Nothing in here allocates; every query that can fail returns `Option`.

use bitflags::bitflags;
use glam::DVec2;

/// Point or displacement, depending on context.
pub type Vector = DVec2;

/// Tolerance used by every "is this zero / parallel / on the line" test.
pub const EPSILON: f64 = 1e-6;

#[inline(always)]
pub fn is_zero(f: f64) -> bool {
    f.abs() < EPSILON
}

#[inline(always)]
pub fn approx_eq(a: f64, b: f64) -> bool {
    is_zero(a - b)
}

/// -1, 0 or 1, with a dead band of `EPSILON` around zero.
#[inline]
pub fn sign(f: f64) -> i32 {
    if is_zero(f) {
        0
    } else if f > 0.0 {
        1
    } else {
        -1
    }
}

/*----------------------------- vectors ------------------------------*/

/// The handful of operations `glam` does not spell the way we need them.
pub trait VectorExt: Copy {
    /// z component of the 3-D cross product (`a.x * b.y - a.y * b.x`).
    fn cross(self, other: Self) -> f64;
    /// `self / |self|`, or zero when the length is below `EPSILON`.
    fn unit_or_zero(self) -> Self;
    /// Rotate `angle` radians clockwise (on screen).
    fn rotated(self, angle: f64) -> Self;
    /// Component of `self` along `onto`. Zero if `onto` is zero.
    fn project(self, onto: Self) -> Self;
    fn with_length(self, len: f64) -> Self;
    /// Signed angle in `[-PI/2, PI/2]`; positive when the short way from
    /// `self` to `other` is clockwise.
    fn angle_to(self, other: Self) -> f64;
    fn is_parallel(self, other: Self) -> bool;
    fn approx_eq(self, other: Self) -> bool;
}

impl VectorExt for Vector {
    #[inline(always)]
    fn cross(self, other: Self) -> f64 {
        self.perp_dot(other)
    }

    #[inline]
    fn unit_or_zero(self) -> Self {
        let len = self.length();
        if is_zero(len) {
            Vector::ZERO
        } else {
            self / len
        }
    }

    #[inline]
    fn rotated(self, angle: f64) -> Self {
        Vector::from_angle(angle).rotate(self)
    }

    #[inline]
    fn project(self, onto: Self) -> Self {
        let dir = onto.unit_or_zero();
        dir * self.dot(dir)
    }

    #[inline]
    fn with_length(self, len: f64) -> Self {
        self.unit_or_zero() * len
    }

    fn angle_to(self, other: Self) -> f64 {
        let lengths = self.length() * other.length();
        if is_zero(lengths) {
            return 0.0;
        }
        (self.cross(other) / lengths).clamp(-1.0, 1.0).asin()
    }

    #[inline(always)]
    fn is_parallel(self, other: Self) -> bool {
        is_zero(self.cross(other))
    }

    #[inline]
    fn approx_eq(self, other: Self) -> bool {
        approx_eq(self.x, other.x) && approx_eq(self.y, other.y)
    }
}

/*----------------------------- segments -----------------------------*/

/// Finite segment. `start -> end` fixes which side is "right".
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Segment {
    pub start: Vector,
    pub end: Vector,
}

impl Segment {
    #[inline]
    pub const fn new(start: Vector, end: Vector) -> Self {
        Self { start, end }
    }

    #[inline(always)]
    pub fn dir(&self) -> Vector {
        self.end - self.start
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.dir().length()
    }

    pub fn is_degenerate(&self) -> bool {
        is_zero(self.length())
    }

    /// Infinite line through both endpoints (direction is *not* normalised).
    #[inline]
    pub fn support_line(&self) -> Line {
        Line::new(self.start, self.dir())
    }

    pub fn center(&self) -> Vector {
        (self.start + self.end) * 0.5
    }

    /// Cut at `p` (assumed to lie on the segment):
    ///
    /// ```text
    /// start ·--------· p ·------· end
    ///       \___a____/   \__b___/
    /// ```
    pub fn split_at(&self, p: Vector) -> (Segment, Segment) {
        (Segment::new(self.start, p), Segment::new(p, self.end))
    }

    pub fn translate(&self, d: Vector) -> Segment {
        Segment::new(self.start + d, self.end + d)
    }

    /// Rotate both endpoints around the origin.
    pub fn rotate(&self, angle: f64) -> Segment {
        Segment::new(self.start.rotated(angle), self.end.rotated(angle))
    }

    pub fn rotate_around(&self, angle: f64, pivot: Vector) -> Segment {
        self.translate(-pivot).rotate(angle).translate(pivot)
    }

    /// Collinear *and* between the endpoints (both inclusive).
    pub fn contains_point(&self, p: Vector) -> bool {
        let ab = self.dir();
        let ap = p - self.start;

        if !ab.is_parallel(ap) {
            return false;
        }

        let dot = ab.dot(ap);
        dot >= 0.0 && dot <= ab.length_squared()
    }

    /// Closest point of the segment to `p`: the foot of the perpendicular when
    /// it falls inside the segment, otherwise the nearer endpoint.
    pub fn nearest_point(&self, p: Vector) -> Vector {
        let ap = p.distance(self.start);
        let bp = p.distance(self.end);

        let perpendicular = Line::new(p, self.dir().perp());
        if let Some(foot) = self.line_intersection(&perpendicular) {
            let d = p.distance(foot);
            if d < ap && d < bp {
                return foot;
            }
        }

        if ap < bp { self.start } else { self.end }
    }

    pub fn distance_to_point(&self, p: Vector) -> f64 {
        p.distance(self.nearest_point(p))
    }

    /// ```text
    ///        ^ r
    /// A     /       B
    /// ·----/--------·
    ///     /
    /// P  ·
    ///
    /// A + t(B - A) = P + s r,   t in [0, 1],  s in [0, inf)
    ///
    /// t = ((P - A) x r) / ((B - A) x r)
    /// s = ((B - A) x (P - A)) / (r x (B - A))
    /// ```
    ///
    /// Parallel rays never hit.
    #[inline]
    pub fn ray_intersection(&self, ray: &Ray) -> Option<Vector> {
        let ab = self.dir();
        let ap = ray.start - self.start;
        let r = ray.dir;

        if ab.is_parallel(r) {
            return None;
        }

        let t = ap.cross(r) / ab.cross(r);
        let s = ab.cross(ap) / r.cross(ab);

        ((0.0..=1.0).contains(&t) && s >= 0.0).then(|| ray.point_at(s))
    }

    /// Same system as [`Segment::ray_intersection`] with `s` unbounded.
    pub fn line_intersection(&self, line: &Line) -> Option<Vector> {
        let ab = self.dir();
        let ap = line.start - self.start;
        let r = line.dir;

        if ab.is_parallel(r) {
            return None;
        }

        let t = ap.cross(r) / ab.cross(r);
        (0.0..=1.0).contains(&t).then(|| self.start + ab * t)
    }

    /// Both parameters restricted to `[0, 1]`.
    pub fn segment_intersection(&self, other: &Segment) -> Option<Vector> {
        let ab = self.dir();
        let cd = other.dir();

        if ab.is_parallel(cd) {
            return None;
        }

        let ac = other.start - self.start;
        let ca = self.start - other.start;

        let t = ac.cross(cd) / ab.cross(cd);
        let s = ca.cross(ab) / cd.cross(ab);

        ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&s)).then(|| self.start + ab * t)
    }

    pub fn approx_eq(&self, other: &Segment) -> bool {
        self.start.approx_eq(other.start) && self.end.approx_eq(other.end)
    }
}

/*------------------------------ lines -------------------------------*/

/// `start + s * dir`. Used both as an infinite line and, with `s >= 0`, as a
/// ray; `dir` keeps its magnitude because sweeps reuse it as a velocity.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Line {
    pub start: Vector,
    pub dir: Vector,
}

pub type Ray = Line;

impl Line {
    #[inline]
    pub const fn new(start: Vector, dir: Vector) -> Self {
        Self { start, dir }
    }

    #[inline(always)]
    pub fn point_at(&self, s: f64) -> Vector {
        self.start + self.dir * s
    }

    /// Unit vector perpendicular to the line (`dir` turned 90° clockwise).
    #[inline]
    pub fn normal(&self) -> Vector {
        self.dir.perp().unit_or_zero()
    }

    /// `> 0` when `p` lies on the right of `dir`, `< 0` on the left,
    /// `0` when it is on the line.
    #[inline]
    pub fn side(&self, p: Vector) -> i32 {
        sign(self.dir.cross(p - self.start))
    }

    /// Perpendicular distance from `p` to the line.
    #[inline]
    pub fn distance_to_point(&self, p: Vector) -> f64 {
        let len = self.dir.length();
        if is_zero(len) {
            return p.distance(self.start);
        }
        self.dir.cross(p - self.start).abs() / len
    }

    pub fn line_intersection(&self, other: &Line) -> Option<Vector> {
        self.crossing_param(other).map(|s| self.point_at(s))
    }

    /// Treats `self` as a ray: only crossings ahead of `start` count.
    pub fn ray_line_intersection(&self, line: &Line) -> Option<Vector> {
        self.crossing_param(line)
            .filter(|&s| s >= 0.0)
            .map(|s| self.point_at(s))
    }

    /// `s` such that `self.point_at(s)` lies on `other`.
    fn crossing_param(&self, other: &Line) -> Option<f64> {
        if self.dir.is_parallel(other.dir) {
            return None;
        }
        let ba = other.start - self.start;
        Some(ba.cross(other.dir) / self.dir.cross(other.dir))
    }
}

/*------------------------------- boxes ------------------------------*/

bitflags! {
    /// Cohen–Sutherland outcodes.
    ///
    /// ```text
    /// 1001 | 1000 | 1010
    /// -----|------|-----
    /// 0001 | 0000 | 0010
    /// -----|------|-----
    /// 0101 | 0100 | 0110
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Region: u8 {
        const LEFT   = 1 << 0;
        const RIGHT  = 1 << 1;
        const BOTTOM = 1 << 2;
        const TOP    = 1 << 3;
    }
}

/// Axis-aligned box. With y pointing down `min` is the top-left corner and
/// `max` the bottom-right one.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Aabb {
    pub min: Vector,
    pub max: Vector,
}

impl Aabb {
    #[inline]
    pub const fn new(min: Vector, max: Vector) -> Self {
        Self { min, max }
    }

    pub fn from_edges(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self::new(Vector::new(left, top), Vector::new(right, bottom))
    }

    /// Smallest box around all `points`; `None` for an empty iterator.
    pub fn around<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vector>,
    {
        let mut it = points.into_iter();
        let first = it.next()?;
        Some(it.fold(Self::new(first, first), |b, p| {
            Self::new(b.min.min(p), b.max.max(p))
        }))
    }

    #[inline(always)]
    pub fn left(&self) -> f64 {
        self.min.x
    }
    #[inline(always)]
    pub fn right(&self) -> f64 {
        self.max.x
    }
    #[inline(always)]
    pub fn top(&self) -> f64 {
        self.min.y
    }
    #[inline(always)]
    pub fn bottom(&self) -> f64 {
        self.max.y
    }

    pub fn center(&self) -> Vector {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector {
        self.max - self.min
    }

    /// Points within `EPSILON` of a border count as inside.
    pub fn contains(&self, p: Vector) -> bool {
        let left = p.x > self.left() || approx_eq(p.x, self.left());
        let right = p.x < self.right() || approx_eq(p.x, self.right());
        let top = p.y > self.top() || approx_eq(p.y, self.top());
        let bottom = p.y < self.bottom() || approx_eq(p.y, self.bottom());
        left && right && top && bottom
    }

    fn region(&self, p: Vector) -> Region {
        let mut code = Region::empty();
        if p.y < self.top() && !approx_eq(p.y, self.top()) {
            code |= Region::TOP;
        }
        if p.y > self.bottom() && !approx_eq(p.y, self.bottom()) {
            code |= Region::BOTTOM;
        }
        if p.x > self.right() && !approx_eq(p.x, self.right()) {
            code |= Region::RIGHT;
        }
        if p.x < self.left() && !approx_eq(p.x, self.left()) {
            code |= Region::LEFT;
        }
        code
    }

    /// Part of `seg` inside the box, if any.
    ///
    /// Trivially accepts/rejects on the outcodes, otherwise moves each
    /// outside endpoint onto the violated edges (horizontal edges first, then
    /// vertical ones) and classifies once more. One pass is enough for a
    /// rectangle.
    pub fn clip_segment(&self, seg: &Segment) -> Option<Segment> {
        let start_code = self.region(seg.start);
        let end_code = self.region(seg.end);

        if (start_code | end_code).is_empty() {
            return Some(*seg);
        }
        if start_code.intersects(end_code) {
            return None;
        }

        let mut out = *seg;
        let start_code = self.clip_endpoint(&mut out, Endpoint::Start, start_code);
        let end_code = self.clip_endpoint(&mut out, Endpoint::End, end_code);

        (start_code | end_code).is_empty().then_some(out)
    }

    fn clip_endpoint(&self, seg: &mut Segment, which: Endpoint, mut code: Region) -> Region {
        let top = Line::new(self.min, Vector::X);
        let bottom = Line::new(Vector::new(self.left(), self.bottom()), Vector::X);
        let left = Line::new(self.min, Vector::Y);
        let right = Line::new(Vector::new(self.right(), self.top()), Vector::Y);

        let passes = [
            [(Region::TOP, top), (Region::BOTTOM, bottom)],
            [(Region::LEFT, left), (Region::RIGHT, right)],
        ];

        for pass in passes {
            let Some((_, edge)) = pass.iter().find(|(flag, _)| code.contains(*flag)) else {
                continue;
            };
            if let Some(hit) = seg.line_intersection(edge) {
                *which.of(seg) = hit;
            }
            code = self.region(*which.of(seg));
        }
        code
    }
}

#[derive(Clone, Copy)]
enum Endpoint {
    Start,
    End,
}

impl Endpoint {
    fn of(self, seg: &mut Segment) -> &mut Vector {
        match self {
            Endpoint::Start => &mut seg.start,
            Endpoint::End => &mut seg.end,
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI, SQRT_2};

    fn v(x: f64, y: f64) -> Vector {
        Vector::new(x, y)
    }

    #[test]
    fn sum_then_sub_round_trips() {
        let samples = [v(1.5, -2.0), v(0.0, 0.0), v(-300.25, 17.0), v(1e-3, 1e5)];
        for a in samples {
            for b in samples {
                assert!(((a + b) - b).approx_eq(a));
            }
        }
    }

    #[test]
    fn cross_is_antisymmetric() {
        let a = v(3.0, -1.0);
        let b = v(0.5, 4.0);
        assert_eq!(a.cross(b), -b.cross(a));
        assert_eq!(a.cross(b), 12.5);
    }

    #[test]
    fn normalised_vectors_have_unit_length() {
        for p in [v(3.0, 4.0), v(-0.01, 0.0), v(1e4, -2e4)] {
            assert!(approx_eq(p.unit_or_zero().length(), 1.0));
        }
        assert_eq!(v(1e-9, 0.0).unit_or_zero(), Vector::ZERO);
    }

    #[test]
    fn rotate_and_back() {
        let p = v(2.0, -7.0);
        for angle in [0.1, 1.0, -2.5, PI, 10.0] {
            assert!(p.rotated(angle).rotated(-angle).approx_eq(p));
        }
    }

    #[test]
    fn positive_rotation_is_clockwise_on_screen() {
        // +x turned a quarter clockwise on a y-down screen points down (+y).
        assert!(Vector::X.rotated(FRAC_PI_2).approx_eq(Vector::Y));
        assert!(Vector::X.perp().approx_eq(Vector::Y));
    }

    #[test]
    fn project_and_angle() {
        assert!(v(3.0, 4.0).project(v(10.0, 0.0)).approx_eq(v(3.0, 0.0)));
        assert_eq!(v(3.0, 4.0).project(Vector::ZERO), Vector::ZERO);
        assert!(approx_eq(Vector::X.angle_to(v(1.0, 1.0)), PI / 4.0));
        assert!(approx_eq(Vector::X.angle_to(v(1.0, -1.0)), -PI / 4.0));
        assert!(approx_eq(v(1.0, 1.0).with_length(SQRT_2).x, 1.0));
    }

    #[test]
    fn ray_hits_crossing_segment() {
        let ray = Ray::new(Vector::ZERO, v(1.0, 0.0));
        let seg = Segment::new(v(2.0, -1.0), v(2.0, 1.0));
        let hit = seg.ray_intersection(&ray).expect("ray should hit");
        assert!(hit.approx_eq(v(2.0, 0.0)));
    }

    #[test]
    fn ray_misses_parallel_and_behind() {
        let ray = Ray::new(Vector::ZERO, v(1.0, 0.0));
        assert_eq!(Segment::new(v(0.0, 1.0), v(5.0, 1.0)).ray_intersection(&ray), None);
        assert_eq!(Segment::new(v(-2.0, -1.0), v(-2.0, 1.0)).ray_intersection(&ray), None);
        // passes beside the segment
        assert_eq!(Segment::new(v(2.0, 1.0), v(2.0, 3.0)).ray_intersection(&ray), None);
    }

    #[test]
    fn segment_segment_needs_both_params_in_range() {
        let a = Segment::new(v(0.0, 0.0), v(4.0, 4.0));
        let b = Segment::new(v(0.0, 4.0), v(4.0, 0.0));
        assert!(a.segment_intersection(&b).unwrap().approx_eq(v(2.0, 2.0)));

        let short = Segment::new(v(0.0, 4.0), v(1.0, 3.0));
        assert_eq!(a.segment_intersection(&short), None);
        assert!(a.line_intersection(&short.support_line()).unwrap().approx_eq(v(2.0, 2.0)));
    }

    #[test]
    fn line_and_ray_line_crossings() {
        let horizontal = Line::new(v(0.0, 3.0), v(1.0, 0.0));
        let down = Ray::new(Vector::ZERO, v(0.0, 1.0));
        let up = Ray::new(Vector::ZERO, v(0.0, -1.0));

        assert!(down.ray_line_intersection(&horizontal).unwrap().approx_eq(v(0.0, 3.0)));
        assert_eq!(up.ray_line_intersection(&horizontal), None);
        assert!(up.line_intersection(&horizontal).unwrap().approx_eq(v(0.0, 3.0)));
        assert_eq!(horizontal.line_intersection(&Line::new(Vector::ZERO, v(-2.0, 0.0))), None);
    }

    #[test]
    fn point_on_segment() {
        let s = Segment::new(v(0.0, 0.0), v(4.0, 2.0));
        assert!(s.contains_point(v(2.0, 1.0)));
        assert!(s.contains_point(s.start));
        assert!(s.contains_point(s.end));
        assert!(!s.contains_point(v(6.0, 3.0)));
        assert!(!s.contains_point(v(-2.0, -1.0)));
        assert!(!s.contains_point(v(2.0, 1.5)));
    }

    #[test]
    fn nearest_point_is_perpendicular_foot() {
        let s = Segment::new(v(0.0, 0.0), v(2.0, 2.0));
        let p = v(2.0, 0.0);
        assert!(s.nearest_point(p).approx_eq(v(1.0, 1.0)));
        assert!(approx_eq(s.distance_to_point(p), SQRT_2));
    }

    #[test]
    fn nearest_point_falls_back_to_endpoint() {
        let s = Segment::new(v(0.0, 0.0), v(2.0, 0.0));
        assert!(s.nearest_point(v(5.0, 1.0)).approx_eq(s.end));
        assert!(s.nearest_point(v(-3.0, -3.0)).approx_eq(s.start));
    }

    #[test]
    fn line_side_and_distance() {
        let l = Line::new(v(0.0, 0.0), v(10.0, 0.0));
        assert_eq!(l.side(v(3.0, 2.0)), 1);
        assert_eq!(l.side(v(3.0, -2.0)), -1);
        assert_eq!(l.side(v(30.0, 0.0)), 0);
        assert!(approx_eq(l.distance_to_point(v(-4.0, -2.5)), 2.5));
        assert!(l.normal().approx_eq(v(0.0, 1.0)));
    }

    #[test]
    fn segment_transforms() {
        let s = Segment::new(v(1.0, 0.0), v(3.0, 0.0));
        assert!(s.center().approx_eq(v(2.0, 0.0)));
        let (a, b) = s.split_at(v(2.5, 0.0));
        assert_eq!(a.end, b.start);
        assert!(s.translate(v(0.0, 1.0)).approx_eq(&Segment::new(v(1.0, 1.0), v(3.0, 1.0))));
        let r = s.rotate_around(PI, v(2.0, 0.0));
        assert!(r.approx_eq(&Segment::new(v(3.0, 0.0), v(1.0, 0.0))));
    }

    #[test]
    fn box_contains_with_tolerant_border() {
        let b = Aabb::from_edges(0.0, 10.0, 0.0, 20.0);
        assert!(b.contains(v(5.0, 5.0)));
        assert!(b.contains(v(20.0, 10.0)));
        assert!(b.contains(v(-1e-8, 0.0)));
        assert!(!b.contains(v(21.0, 5.0)));
        assert!(!b.contains(v(5.0, -0.5)));
    }

    #[test]
    fn box_around_points() {
        let b = Aabb::around([v(1.0, 5.0), v(-3.0, 2.0), v(4.0, -1.0)]).unwrap();
        assert_eq!(b, Aabb::from_edges(-1.0, 5.0, -3.0, 4.0));
        assert_eq!(Aabb::around(std::iter::empty()), None);
    }

    #[test]
    fn clip_inside_is_identity() {
        let b = Aabb::from_edges(0.0, 10.0, 0.0, 10.0);
        let s = Segment::new(v(1.0, 1.0), v(9.0, 5.0));
        assert_eq!(b.clip_segment(&s), Some(s));
    }

    #[test]
    fn clip_rejects_segment_on_one_side() {
        let b = Aabb::from_edges(0.0, 10.0, 0.0, 10.0);
        assert_eq!(b.clip_segment(&Segment::new(v(-5.0, -1.0), v(15.0, -3.0))), None);
        assert_eq!(b.clip_segment(&Segment::new(v(11.0, 0.0), v(12.0, 9.0))), None);
    }

    #[test]
    fn clip_cuts_crossing_segments() {
        let b = Aabb::from_edges(0.0, 10.0, 0.0, 10.0);

        let through = b.clip_segment(&Segment::new(v(-5.0, 5.0), v(15.0, 5.0))).unwrap();
        assert!(through.approx_eq(&Segment::new(v(0.0, 5.0), v(10.0, 5.0))));

        let half = b.clip_segment(&Segment::new(v(5.0, 5.0), v(5.0, 20.0))).unwrap();
        assert!(half.approx_eq(&Segment::new(v(5.0, 5.0), v(5.0, 10.0))));

        let diagonal = b.clip_segment(&Segment::new(v(-5.0, -5.0), v(15.0, 15.0))).unwrap();
        assert!(diagonal.approx_eq(&Segment::new(v(0.0, 0.0), v(10.0, 10.0))));
    }

    #[test]
    fn clip_rejects_segment_cutting_only_a_corner_region() {
        let b = Aabb::from_edges(0.0, 10.0, 0.0, 10.0);
        // left of the box to above it, passing outside the top-left corner
        let s = Segment::new(v(-2.0, 1.0), v(1.0, -2.0));
        assert_eq!(b.clip_segment(&s), None);
    }
}
