use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::error::MosaicError;

/// Tile selection strategy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    Greedy,
    Lazy,
    Random,
    Full,
}

/// How an image is resized into a fixed-size box.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum FitMode {
    Stretch,
    Crop,
    Pad,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum TileShape {
    Rect,
    Hex,
}

/// What shows through the gaps between hex cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum HexBackground {
    Source,
    Solid,
}

/// Every parameter of a single mosaic build.
#[derive(Debug, Clone)]
pub struct MosaicConfig {
    pub source_image: PathBuf,
    pub tile_dirs: Vec<PathBuf>,
    pub output_path: PathBuf,
    pub tile_width: u32,
    pub tile_height: u32,
    pub output_width: Option<u32>,
    pub output_height: Option<u32>,
    pub tile_shape: TileShape,
    pub hex_overlap: f64,
    pub hex_edge_softness: f64,
    pub hex_background: HexBackground,
    pub fit_mode: FitMode,
    pub strategy: Strategy,
    pub max_repeats: Option<usize>,
    pub max_usage_percent: Option<f64>,
    pub lazy_randomness: f64,
    pub lazy_top_k: usize,
    pub random_steps: usize,
    pub full_steps: usize,
    pub cache_path: Option<PathBuf>,
    pub refresh_cache: bool,
    pub seed: u64,
}

impl MosaicConfig {
    pub fn new(source_image: PathBuf, tile_dirs: Vec<PathBuf>, output_path: PathBuf) -> Self {
        MosaicConfig {
            source_image,
            tile_dirs,
            output_path,
            tile_width: 16,
            tile_height: 16,
            output_width: None,
            output_height: None,
            tile_shape: TileShape::Rect,
            hex_overlap: 0.25,
            hex_edge_softness: 0.2,
            hex_background: HexBackground::Source,
            fit_mode: FitMode::Crop,
            strategy: Strategy::Greedy,
            max_repeats: None,
            max_usage_percent: None,
            lazy_randomness: 0.15,
            lazy_top_k: 5,
            random_steps: 0,
            full_steps: 2000,
            cache_path: None,
            refresh_cache: false,
            seed: 7,
        }
    }

    pub fn tile_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    /// Checks every bound before any image is touched.
    pub(crate) fn validate(&self) -> Result<(), MosaicError> {
        let fail = |msg: String| Err(MosaicError::Configuration(msg));

        if self.tile_dirs.is_empty() {
            return fail("At least one tile directory is required".to_string());
        }
        for (name, value) in [("tile width", self.tile_width), ("tile height", self.tile_height)] {
            if !(2..=512).contains(&value) {
                return fail(format!("{} must be between 2 and 512, got {}", name, value));
            }
        }
        for (name, value) in [
            ("output width", self.output_width),
            ("output height", self.output_height),
        ] {
            if let Some(value) = value {
                if !(32..=20000).contains(&value) {
                    return fail(format!("{} must be between 32 and 20000, got {}", name, value));
                }
            }
        }
        if !(0.0..0.95).contains(&self.hex_overlap) {
            return fail(format!("hex overlap must be in [0, 0.95), got {}", self.hex_overlap));
        }
        if !(0.0..=1.0).contains(&self.hex_edge_softness) {
            return fail(format!(
                "hex edge softness must be in [0, 1], got {}",
                self.hex_edge_softness
            ));
        }
        if !(0.0..=1.0).contains(&self.lazy_randomness) {
            return fail(format!(
                "lazy randomness must be in [0, 1], got {}",
                self.lazy_randomness
            ));
        }
        if self.max_repeats == Some(0) {
            return fail("max repeats must be at least 1".to_string());
        }
        if let Some(percent) = self.max_usage_percent {
            if !(percent > 0.0 && percent <= 100.0) {
                return fail(format!("max usage percent must be in (0, 100], got {}", percent));
            }
        }
        if !(1..=200).contains(&self.lazy_top_k) {
            return fail(format!("lazy top-k must be between 1 and 200, got {}", self.lazy_top_k));
        }
        if self.random_steps > 500_000 {
            return fail(format!("random steps must be at most 500000, got {}", self.random_steps));
        }
        if self.full_steps > 1_000_000 {
            return fail(format!("full steps must be at most 1000000, got {}", self.full_steps));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MosaicConfig {
        MosaicConfig::new(
            PathBuf::from("source.png"),
            vec![PathBuf::from("tiles")],
            PathBuf::from("out.png"),
        )
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(config().validate().is_ok());
        assert_eq!(config().tile_size(), (16, 16));
    }

    #[test]
    fn test_no_tile_dirs_is_configuration_error() {
        let mut config = config();
        config.tile_dirs.clear();
        assert!(matches!(config.validate(), Err(MosaicError::Configuration(_))));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let cases: Vec<Box<dyn Fn(&mut MosaicConfig)>> = vec![
            Box::new(|c| c.tile_width = 1),
            Box::new(|c| c.tile_height = 513),
            Box::new(|c| c.output_width = Some(31)),
            Box::new(|c| c.hex_overlap = 0.95),
            Box::new(|c| c.hex_edge_softness = 1.5),
            Box::new(|c| c.lazy_randomness = -0.1),
            Box::new(|c| c.max_repeats = Some(0)),
            Box::new(|c| c.max_usage_percent = Some(0.0)),
            Box::new(|c| c.lazy_top_k = 0),
            Box::new(|c| c.full_steps = 1_000_001),
        ];
        for mutate in cases {
            let mut config = config();
            mutate(&mut config);
            assert!(config.validate().is_err());
        }
    }
}
