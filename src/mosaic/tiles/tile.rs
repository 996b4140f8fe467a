use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::mosaic::color::AvgColor;

/// A tile image and its precomputed average color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub path: PathBuf,
    pub avg_rgb: AvgColor,
}

impl Tile {
    pub fn new(path: PathBuf, avg_rgb: AvgColor) -> Tile {
        Tile { path, avg_rgb }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
}
