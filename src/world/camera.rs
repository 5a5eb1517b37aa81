/// Default horizontal field of view, degrees.
pub const DEFAULT_FOV_DEG: f64 = 75.0;
/// Near clip distance in map units.
pub const NEAR: f64 = 1.0;
/// Beyond this distance colours fade towards black.
pub const FAR: f64 = 300.0;
/// Every wall is extruded to this height; the eye sits halfway up.
pub const WALL_HEIGHT: f64 = 64.0;

/// Optical parameters of the first-person view.
///
/// * The viewer's position and heading are *not* stored here – they come
///   from the [`Mobile`](crate::sim::Mobile) being looked through.
/// * The eye is always at half the wall height, so floor and ceiling mirror
///   each other around the horizon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    fov: f64,         // horizontal FoV (radians)
    near: f64,        // hits closer than this are ignored
    far: f64,         // start of distance fog
    wall_height: f64, // map units
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov: DEFAULT_FOV_DEG.to_radians(),
            near: NEAR,
            far: FAR,
            wall_height: WALL_HEIGHT,
        }
    }
}

impl Camera {
    /// Default camera with horizontal FoV `fov` (radians).
    pub fn new(fov: f64) -> Self {
        Self {
            fov,
            ..Self::default()
        }
    }

    pub fn with_clip(mut self, near: f64, far: f64) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn with_wall_height(mut self, wall_height: f64) -> Self {
        self.wall_height = wall_height;
        self
    }

    #[inline(always)]
    pub fn fov(&self) -> f64 {
        self.fov
    }
    #[inline(always)]
    pub fn near(&self) -> f64 {
        self.near
    }
    #[inline(always)]
    pub fn far(&self) -> f64 {
        self.far
    }
    #[inline(always)]
    pub fn wall_height(&self) -> f64 {
        self.wall_height
    }
    #[inline(always)]
    pub fn eye_height(&self) -> f64 {
        self.wall_height * 0.5
    }

    /// Distance from the eye to the projection plane for a viewport `w`
    /// pixels wide.
    ///
    /// ```text
    /// viewplane = (w / 2) / tan(fov / 2)
    /// ```
    #[inline]
    pub fn viewplane_distance(&self, w: usize) -> f64 {
        (w as f64) * 0.5 / (self.fov * 0.5).tan()
    }

    /// Angle between the view axis and the ray through the centre of
    /// column `x` (negative = left of centre).
    #[inline]
    pub fn ray_angle(&self, x: usize, w: usize) -> f64 {
        let offset = (x as f64 + 0.5) - (w as f64) * 0.5;
        offset.atan2(self.viewplane_distance(w))
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
