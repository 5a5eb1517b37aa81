//! Yet another raycasting engine.
//!
//! * [`world`]    – geometry kernel, walls, camera and textures.
//! * [`sim`]      – moving circles, swept collision with sliding, input and the
//!   fixed-rate tic loop.
//! * [`renderer`] – the [`renderer::Renderer`] seam and its software back-end.
//! * [`mapfile`]  – the plain-text map format.

pub mod mapfile;
pub mod renderer;
pub mod sim;
pub mod world;
