use std::iter::FromIterator;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use super::tile::Tile;
use super::utils::prepare_tile;
use crate::mosaic::cache;
use crate::mosaic::color::{average_color, average_color_masked, AvgColor};
use crate::mosaic::config::{FitMode, TileShape};
use crate::mosaic::error::{ImageError, MosaicError};
use crate::mosaic::image::discover_tiles;
use crate::mosaic::mask::hex_mask;
use crate::mosaic::progress_bar;

/// Settings that determine a tile's average color.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexSettings {
    pub tile_size: (u32, u32),
    pub fit_mode: FitMode,
    pub shape: TileShape,
    pub edge_softness: f64,
}

/// The tile library: every usable tile with its average color, in
/// discovery order.
#[derive(Clone, Debug, Default)]
pub struct TileSet {
    pub tiles: Vec<Tile>,
}

impl TileSet {
    pub fn from_tiles(tiles: Vec<Tile>) -> TileSet {
        TileSet { tiles }
    }

    /// Index the tiles under `dirs`, reusing the record at `cache_path` when
    /// it was built with the same settings.
    ///
    /// Files that fail to decode are reported and skipped. The result may be
    /// empty.
    pub fn build(
        dirs: &[PathBuf],
        settings: &IndexSettings,
        cache_path: Option<&Path>,
        refresh: bool,
    ) -> Result<TileSet, MosaicError> {
        if let Some(path) = cache_path.filter(|_| !refresh) {
            if let Some(tiles) = cache::load(path, settings) {
                let total = tiles.len();
                let tiles: Vec<_> = tiles.into_iter().filter(|t| t.path.exists()).collect();
                if tiles.len() < total {
                    eprintln!("Dropped {} cached tiles whose files no longer exist", total - tiles.len());
                }
                if !tiles.is_empty() {
                    eprintln!("Reusing tile index cache {}", path.display());
                    return Ok(TileSet::from_tiles(tiles));
                }
                eprintln!("No cached tiles left, re-analysing tiles");
            }
        }

        let paths = discover_tiles(dirs)?;
        let tile_set = analyse_tiles(paths, settings);
        // empty indexes are not stored
        if let (Some(path), false) = (cache_path, tile_set.is_empty()) {
            cache::store(path, settings, &tile_set.tiles)?;
        }
        Ok(tile_set)
    }

    /// Get the number of tiles in the set.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Average colors, indexed like the tiles.
    pub fn palette(&self) -> Vec<AvgColor> {
        self.tiles.iter().map(|tile| tile.avg_rgb).collect()
    }

    /// Get the file path for a tile index.
    pub fn get_path(&self, idx: usize) -> &Path {
        self.tiles[idx].path()
    }
}

fn analyse_tiles(paths: Vec<PathBuf>, settings: &IndexSettings) -> TileSet {
    let mask = match settings.shape {
        TileShape::Hex => Some(hex_mask(settings.tile_size, settings.edge_softness)),
        TileShape::Rect => None,
    };
    let pb = progress_bar(paths.len() as u64, "Analysing tiles");

    let errors: Mutex<Vec<ImageError>> = Mutex::new(vec![]);
    let analysed: Vec<Option<Tile>> = paths
        .into_par_iter()
        .map(|path| {
            let result = prepare_tile(&path, settings.tile_size, settings.fit_mode);
            pb.inc(1);
            match result {
                Ok(img) => {
                    let avg_rgb = match &mask {
                        Some(mask) => average_color_masked(&img, mask),
                        None => average_color(&img),
                    };
                    Some(Tile::new(path, avg_rgb))
                }
                Err(error) => {
                    if let Ok(mut errors) = errors.lock() {
                        errors.push(error);
                    }
                    None
                }
            }
        })
        .collect();
    pb.finish_and_clear();

    let all_errors = errors.into_inner().unwrap_or_default();
    if !all_errors.is_empty() {
        eprintln!("Failed to read the following images({}):", all_errors.len());
        for error in all_errors {
            eprintln!("- {}", error);
        }
    }

    analysed.into_iter().flatten().collect()
}

impl FromIterator<Tile> for TileSet {
    fn from_iter<I: IntoIterator<Item = Tile>>(iter: I) -> Self {
        TileSet::from_tiles(iter.into_iter().collect())
    }
}

impl FromIterator<(PathBuf, AvgColor)> for TileSet {
    fn from_iter<I: IntoIterator<Item = (PathBuf, AvgColor)>>(iter: I) -> Self {
        iter.into_iter().map(|(path, avg_rgb)| Tile::new(path, avg_rgb)).collect()
    }
}
