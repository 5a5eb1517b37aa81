pub mod camera;
pub mod geometry;
pub mod map;
pub mod texture;

pub use geometry::{Aabb, Line, Ray, Segment, Vector, VectorExt};

pub use map::{DEFAULT_WALL_HEIGHT, Map, Wall, WallId};

pub use camera::Camera;

pub use texture::{NO_TEXTURE, Texture, TextureBank, TextureError, TextureId, shade};
