mod loader;

pub use loader::{MapLoadError, load_map, parse_map};
