//! Rendering abstraction layer.
//!
//! *The simulation never touches a pixel buffer directly.*
//! It describes what to look at with a [`Scene`] and hands it to a type that
//! implements [`Renderer`].
//!
//! * Back-ends own their scratch buffer; `end_frame` lends it out once.
//! * A helper blanket-impl [`RendererExt`] adds `draw_frame` so call-sites
//!   stay short.

use std::time::{Duration, Instant};

use crate::{
    sim::Mobile,
    world::{Camera, Map, TextureBank, TextureId},
};

/// Pixel format of the software frame-buffer (0x00RRGGBB).
pub type Rgba = u32;

/// Which bank textures cover the three surfaces of the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneTextures {
    pub wall: TextureId,
    pub floor: TextureId,
    pub ceiling: TextureId,
}

/// One frame's worth of input for a renderer.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    /// The mobile we look through (position + heading).
    pub pov: &'a Mobile,
    pub map: &'a Map,
    pub camera: &'a Camera,
    pub textures: SceneTextures,
}

/// A renderer that owns an internal scratch buffer for the whole frame.
///
/// `end_frame` hands the finished buffer to a user-supplied closure.
/// Software callers typically forward it to their window-manager.
pub trait Renderer {
    /// (Re)allocate internal scratch for the requested resolution and clear it.
    fn begin_frame(&mut self, width: usize, height: usize);

    /// First-person view of `scene`: textured walls, floor and ceiling.
    /// Marks every wall a ray hits as seen.
    fn draw_scene(&mut self, scene: &Scene, bank: &TextureBank);

    /// Top-down overlay of the map around the viewer.
    fn draw_automap(&mut self, scene: &Scene);

    /// Finish the frame and **loan** the finished buffer to `submit`.
    ///
    /// * `submit(&[Rgba], w, h)` is run exactly once per frame.
    /// * Software caller passes `|fb, w, h| window.update_with_buffer(fb, w, h)`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize);
}

/// Convenience blanket-impl with a one-liner `draw_frame` adaptor.
pub trait RendererExt: Renderer {
    /// Draw a whole frame and submit it. Returns the time spent drawing,
    /// `submit` excluded.
    fn draw_frame<F>(
        &mut self,
        width: usize,
        height: usize,
        scene: &Scene,
        bank: &TextureBank,
        show_map: bool,
        submit: F,
    ) -> Duration
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        let start = Instant::now();
        self.begin_frame(width, height);
        self.draw_scene(scene, bank);
        if show_map {
            self.draw_automap(scene);
        }
        let elapsed = start.elapsed();

        self.end_frame(submit);
        elapsed
    }
}
impl<T: Renderer + ?Sized> RendererExt for T {}

pub mod software;
pub use software::Software;
