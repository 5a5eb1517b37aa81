use std::cell::Cell;

use super::geometry::{Aabb, Segment, Vector};

/// Index of a wall inside [`Map::walls`].
pub type WallId = usize;

/// Height given to walls whose map line carries no height field.
pub const DEFAULT_WALL_HEIGHT: f64 = 64.0;

/// One wall face. The geometry is fixed after load; only the `seen`
/// bookkeeping flips, through a `Cell`, so renderers can share `&Map`.
#[derive(Clone, Debug, PartialEq)]
pub struct Wall {
    pub seg: Segment,
    /// Optional fifth field of the map format. Rendering uses the camera's
    /// single wall height.
    pub height: f64,
    seen: Cell<bool>,
}

impl Wall {
    pub fn new(seg: Segment) -> Self {
        Self::with_height(seg, DEFAULT_WALL_HEIGHT)
    }

    pub fn with_height(seg: Segment, height: f64) -> Self {
        Self {
            seg,
            height,
            seen: Cell::new(false),
        }
    }

    /// Has any ray hit this wall yet (used by the automap only).
    #[inline]
    pub fn seen(&self) -> bool {
        self.seen.get()
    }

    #[inline]
    pub fn mark_seen(&self) {
        self.seen.set(true);
    }
}

/// Runtime snapshot of one map (immutable after load).
#[derive(Debug, Default)]
pub struct Map {
    walls: Box<[Wall]>,
}

impl Map {
    /// Freeze `walls` into a map. Zero-length walls are dropped.
    pub fn new(walls: Vec<Wall>) -> Self {
        let before = walls.len();
        let walls: Box<[Wall]> = walls
            .into_iter()
            .filter(|w| !w.seg.is_degenerate())
            .collect();

        if walls.len() != before {
            log::warn!("dropped {} zero-length walls", before - walls.len());
        }

        Self { walls }
    }

    pub fn from_segments<I>(segs: I) -> Self
    where
        I: IntoIterator<Item = Segment>,
    {
        Self::new(segs.into_iter().map(Wall::new).collect())
    }

    #[inline]
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    #[inline]
    pub fn wall(&self, id: WallId) -> Option<&Wall> {
        self.walls.get(id)
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    /// Box around every wall endpoint; `None` for an empty map.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::around(self.walls.iter().flat_map(|w| [w.seg.start, w.seg.end]))
    }

    /// Centre of [`Map::bounds`], or the origin for an empty map.
    pub fn center(&self) -> Vector {
        self.bounds().map_or(Vector::ZERO, |b| b.center())
    }

    pub fn seen_count(&self) -> usize {
        self.walls.iter().filter(|w| w.seen()).count()
    }

    pub fn forget_seen(&self) {
        for w in self.walls.iter() {
            w.seen.set(false);
        }
    }
}

/// Closed square room of side `side`, centred on the origin, walls
/// listed clockwise (top, right, bottom, left).
#[cfg(test)]
pub(crate) fn square_room(side: f64) -> Map {
    let h = side * 0.5;
    let corners = [
        Vector::new(-h, -h),
        Vector::new(h, -h),
        Vector::new(h, h),
        Vector::new(-h, h),
    ];
    Map::from_segments((0..4).map(|i| Segment::new(corners[i], corners[(i + 1) % 4])))
}
