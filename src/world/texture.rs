// Format-agnostic repository of textures handed over by whatever loads the
// assets. The renderer and world logic interact through `TextureId` only.

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
};

use crate::renderer::Rgba;

/// Runtime handle for a texture in this bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type TextureId = u16;

/// `TextureId` whose pixels are the checkerboard fallback.
/// Always = 0 because `TextureBank::new()` inserts it first.
pub const NO_TEXTURE: TextureId = 0;

/// CPU-side storage: 32-bit **0x00RRGGBB** in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<Rgba>,
}

/// Convenience checkerboard 8×8 (magenta/black, hard to miss).
impl Default for Texture {
    fn default() -> Self {
        Texture::checker("CHECKER", 8, 1, 0x00_FF00FF, 0x00_000000)
    }
}

impl Texture {
    /// Wrap a decoded pixel buffer, checking that the sizes agree.
    pub fn new<S: Into<String>>(
        name: S,
        w: usize,
        h: usize,
        pixels: Vec<Rgba>,
    ) -> Result<Self, TextureError> {
        if w == 0 || h == 0 || pixels.len() != w * h {
            return Err(TextureError::BadSize {
                w,
                h,
                len: pixels.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            w,
            h,
            pixels,
        })
    }

    /// Decode a PNG or JPEG file into a texture named after the file stem.
    /// Alpha is dropped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|err| match err {
                image::ImageError::IoError(source) => TextureError::Io {
                    path: path.to_path_buf(),
                    source,
                },
                source => TextureError::Decode {
                    path: path.to_path_buf(),
                    source,
                },
            })?
            .into_rgb8();

        let (w, h) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|p| {
                let [r, g, b] = p.0;
                (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
            })
            .collect();
        let name = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());

        let tex = Self::new(name, w as usize, h as usize, pixels)?;
        log::debug!("loaded {}×{} texture from {}", tex.w, tex.h, path.display());
        Ok(tex)
    }

    /// Square checkerboard, `size` px wide, cells `cell` px wide.
    pub fn checker<S: Into<String>>(name: S, size: usize, cell: usize, a: Rgba, b: Rgba) -> Self {
        let cell = cell.max(1);
        let pixels = (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                if ((x / cell) ^ (y / cell)) & 1 == 0 { a } else { b }
            })
            .collect();
        Self {
            name: name.into(),
            w: size,
            h: size,
            pixels,
        }
    }

    /// Running-bond brick wall: 32×16 px bricks, every other row shifted by
    /// half a brick, 2 px of mortar.
    pub fn bricks<S: Into<String>>(name: S, w: usize, h: usize, brick: Rgba, mortar: Rgba) -> Self {
        const BRICK_W: usize = 32;
        const BRICK_H: usize = 16;
        const MORTAR: usize = 2;

        let pixels = (0..w * h)
            .map(|i| {
                let (x, y) = (i % w, i / w);
                let row = y / BRICK_H;
                let shifted = x + (row & 1) * BRICK_W / 2;
                if y % BRICK_H < MORTAR || shifted % BRICK_W < MORTAR {
                    mortar
                } else {
                    // a little per-brick variation so walls don't look flat
                    let brick_idx = row * 7 + shifted / BRICK_W * 13;
                    shade(brick, 0.8 + (brick_idx % 5) as f64 * 0.05)
                }
            })
            .collect();
        Self {
            name: name.into(),
            w,
            h,
            pixels,
        }
    }

    /// Texel at (`u`, `v`), wrapping in both directions.
    #[inline(always)]
    pub fn texel(&self, u: i64, v: i64) -> Rgba {
        let u = u.rem_euclid(self.w as i64) as usize;
        let v = v.rem_euclid(self.h as i64) as usize;
        self.pixels[v * self.w + u]
    }
}

/// Scale every colour channel by `intensity`, clamped to `[0, 1]`: fog can
/// only darken.
#[inline]
pub fn shade(color: Rgba, intensity: f64) -> Rgba {
    let k = intensity.clamp(0.0, 1.0);
    let channel = |shift: u32| ((((color >> shift) & 0xFF) as f64 * k) as u32) << shift;
    (color & 0xFF00_0000) | channel(16) | channel(8) | channel(0)
}

/// Things that can go wrong when loading textures or using the bank.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// Attempted to insert a second texture with an existing name.
    #[error("texture name `{0}` already present in bank")]
    Duplicate(String),

    /// Requested ID is outside `0 .. bank.len()`.
    #[error("texture id {0} out of range")]
    BadId(TextureId),

    /// Pixel count does not match the advertised size.
    #[error("texture is {w}×{h} but carries {len} pixels")]
    BadSize { w: usize, h: usize, len: usize },

    #[error("cannot read texture file `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot decode texture file `{path}`")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// A format-agnostic cache of textures.
///
/// * Does **not** know about files or image formats – see [`Texture::load`].
/// * Stores exactly one copy of every name.
/// * ID **0** is always the "missing" checkerboard.
pub struct TextureBank {
    by_name: HashMap<String, TextureId>,
    data: Vec<Texture>,
}

impl TextureBank {
    // ---------------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------------

    /// Create an empty bank with a mandatory *missing* texture used as
    /// fallback.  The texture is inserted under the fixed name `"MISSING"`
    /// and obtains the handle **0**.
    pub fn new(missing_tex: Texture) -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("MISSING".into(), NO_TEXTURE);
        Self {
            by_name,
            data: vec![missing_tex],
        }
    }

    pub fn default_with_checker() -> Self {
        Self::new(Texture::default())
    }

    // ---------------------------------------------------------------------
    // Query helpers
    // ---------------------------------------------------------------------

    /// Number of textures stored (including the "missing" one).
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    } // only checker

    /// Obtain the id for a *loaded* texture by name.
    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    /// Borrow a texture by id, with bounds-checking.
    pub fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        self.data.get(id as usize).ok_or(TextureError::BadId(id))
    }

    /// Like [`TextureBank::texture`] but never fails: bad ids get the
    /// checkerboard.
    pub fn texture_or_missing(&self, id: TextureId) -> &Texture {
        self.data.get(id as usize).unwrap_or(&self.data[NO_TEXTURE as usize])
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Insert a texture under `name`.
    ///
    /// * Returns the newly assigned `TextureId`.
    /// * Fails if the name already exists (`Duplicate`).
    pub fn insert<S: Into<String>>(
        &mut self,
        name: S,
        tex: Texture,
    ) -> Result<TextureId, TextureError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        let id = self.data.len() as TextureId;
        self.data.push(tex);
        self.by_name.insert(name, id);
        Ok(id)
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
