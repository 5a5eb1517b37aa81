// ──────────────────────────────────────────────────────────────────────────
// mapfile/loader.rs
//
//  *   text file, one wall per line       ──╮
//      `x0 y0 x1 y1 [height]`               │   --->  world::map::Map
//  *   blank lines and `#` comments skipped  ╯
// ──────────────────────────────────────────────────────────────────────────

use std::{
    io,
    path::{Path, PathBuf},
};

use crate::world::{
    DEFAULT_WALL_HEIGHT, Map, Wall,
    geometry::{Segment, Vector},
};
use thiserror::Error;

/*──────────────────────────── Error type ───────────────────────────*/

#[derive(Error, Debug)]
pub enum MapLoadError {
    #[error("map file `{0}` not found")]
    NotFound(PathBuf),

    #[error("cannot read map file `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Wall `wall` (0-based, counting only walls) on 1-based `line` could not
    /// be parsed; nothing after it was loaded.
    #[error("map truncated at wall {wall} (line {line})")]
    Truncated { wall: usize, line: usize },

    #[error("map file `{0}` contains no walls")]
    Empty(PathBuf),
}

/*──────────────────────────── Loading ──────────────────────────────*/

/// Read and parse the map at `path`. A file without a single wall is an
/// error here, unlike in [`parse_map`].
pub fn load_map<P: AsRef<Path>>(path: P) -> Result<Map, MapLoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => MapLoadError::NotFound(path.to_path_buf()),
        _ => MapLoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let map = parse_map(&text)?;
    if map.is_empty() {
        return Err(MapLoadError::Empty(path.to_path_buf()));
    }

    log::info!("loaded {} walls from {}", map.len(), path.display());
    Ok(map)
}

/// Parse map text. Each wall line holds four coordinates and an optional
/// height; any other line shape stops the parse with
/// [`MapLoadError::Truncated`].
pub fn parse_map(text: &str) -> Result<Map, MapLoadError> {
    let mut walls = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let wall = parse_wall(line).ok_or(MapLoadError::Truncated {
            wall: walls.len(),
            line: idx + 1,
        })?;
        walls.push(wall);
    }

    Ok(Map::new(walls))
}

fn parse_wall(line: &str) -> Option<Wall> {
    let mut fields = [0.0f64; 5];
    let mut n = 0;
    for tok in line.split_whitespace() {
        let slot = fields.get_mut(n)?;
        *slot = tok.parse().ok().filter(|v: &f64| v.is_finite())?;
        n += 1;
    }

    let [x0, y0, x1, y1, height] = fields;
    let seg = Segment::new(Vector::new(x0, y0), Vector::new(x1, y1));
    match n {
        4 => Some(Wall::with_height(seg, DEFAULT_WALL_HEIGHT)),
        5 => Some(Wall::with_height(seg, height)),
        _ => None,
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
