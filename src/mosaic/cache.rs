//! On-disk tile index, keyed by the settings that produced it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::config::{FitMode, TileShape};
use super::error::MosaicError;
use super::tiles::{IndexSettings, Tile};

/// Settings a stored index is only valid for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    pub fit_mode: FitMode,
    pub tile_size: [u32; 2],
    pub tile_shape: TileShape,
    /// Rounded to three decimal places.
    pub hex_edge_softness: f64,
}

impl CacheSettings {
    pub fn from_index_settings(settings: &IndexSettings) -> Self {
        CacheSettings {
            fit_mode: settings.fit_mode,
            tile_size: [settings.tile_size.0, settings.tile_size.1],
            tile_shape: settings.shape,
            hex_edge_softness: round_3dp(settings.edge_softness),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub settings: CacheSettings,
    pub tiles: Vec<Tile>,
}

fn round_3dp(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Load the tiles stored at `path` if they were built with `settings`.
///
/// A missing, unreadable, mismatching or empty record is a miss, never an
/// error.
pub fn load(path: &Path, settings: &IndexSettings) -> Option<Vec<Tile>> {
    let bytes = fs::read(path).ok()?;
    let record = match bincode::deserialize::<CacheRecord>(&bytes) {
        Ok(record) => record,
        Err(e) => {
            eprintln!("Ignoring unreadable tile index cache {}: {}", path.display(), e);
            return None;
        }
    };
    if record.settings != CacheSettings::from_index_settings(settings) {
        eprintln!("Tile index cache settings changed, re-analysing tiles");
        return None;
    }
    if record.tiles.is_empty() {
        return None;
    }
    Some(record.tiles)
}

/// Persist `tiles` at `path`, replacing any previous record.
pub fn store(path: &Path, settings: &IndexSettings, tiles: &[Tile]) -> Result<(), MosaicError> {
    let fail = |error: String| MosaicError::CacheWrite {
        path: path.to_owned(),
        error,
    };
    let record = CacheRecord {
        settings: CacheSettings::from_index_settings(settings),
        tiles: tiles.to_vec(),
    };
    let encoded = bincode::serialize(&record).map_err(|e| fail(e.to_string()))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| fail(e.to_string()))?;
    }
    fs::write(path, encoded).map_err(|e| fail(e.to_string()))
}

/// Default index location for a set of tile directories, under the user
/// cache directory.
pub fn default_cache_path(tile_dirs: &[PathBuf]) -> Option<PathBuf> {
    let key = tile_dirs
        .iter()
        .map(|dir| dir.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("\n");
    let digest = md5::compute(key.as_bytes());
    dirs::cache_dir().map(|dir| dir.join("photomosaic").join(format!("index-{:x}.bin", digest)))
}
