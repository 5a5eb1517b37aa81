use crate::world::geometry::{Vector, VectorExt, is_zero};

/// Anything that moves and bumps into walls: a circle of `radius` at `pos`
/// travelling `vel` map units per tic.
///
/// `forward` is kept private so it can only ever hold a unit vector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mobile {
    pub pos: Vector,
    pub vel: Vector,
    forward: Vector,
    pub radius: f64,
}

impl Mobile {
    /// Stationary mobile facing `forward` (normalised here; a zero vector
    /// falls back to +x).
    pub fn new(pos: Vector, forward: Vector, radius: f64) -> Self {
        debug_assert!(radius > 0.0, "mobile radius must be positive");
        let forward = forward.unit_or_zero();
        Self {
            pos,
            vel: Vector::ZERO,
            forward: if forward == Vector::ZERO { Vector::X } else { forward },
            radius,
        }
    }

    #[inline]
    pub fn with_velocity(mut self, vel: Vector) -> Self {
        self.vel = vel;
        self
    }

    /// Unit vector the mobile is facing.
    #[inline(always)]
    pub fn forward(&self) -> Vector {
        self.forward
    }

    /// Unit vector to the mobile's right (forward turned 90° clockwise).
    #[inline(always)]
    pub fn right(&self) -> Vector {
        self.forward.perp()
    }

    /// Face `dir`. Zero vectors are ignored, the heading is kept.
    pub fn face(&mut self, dir: Vector) {
        let dir = dir.unit_or_zero();
        if dir != Vector::ZERO {
            self.forward = dir;
        }
    }

    /// Rotate the heading (positive = clockwise on screen), renormalising so
    /// rounding never accumulates.
    pub fn turn(&mut self, angle: f64) {
        self.face(self.forward.rotated(angle));
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        !is_zero(self.vel.length())
    }
}
