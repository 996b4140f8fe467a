mod mosaic;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{self, Parser};

use mosaic::build_mosaic;
use mosaic::cache::default_cache_path;
use mosaic::config::{FitMode, HexBackground, MosaicConfig, Strategy, TileShape};
use mosaic::image::IMAGE_EXTENSIONS;

#[derive(Parser)]
#[clap(author, version, about = "Builds a photo mosaic from a library of tile images", long_about = None)]
struct Cli {
    /// Path to the source image
    #[clap(long = "source", value_parser)]
    source_image: PathBuf,

    /// Directory containing tile images, can be repeated
    #[clap(long = "tile-dir", required = true, value_parser)]
    tile_dirs: Vec<PathBuf>,

    /// Output image path, the format is inferred from the extension
    #[clap(default_value = "./output.png", short, long = "output", value_parser)]
    output_path: PathBuf,

    /// Width of each tile in the output image
    #[clap(default_value_t = 16, long, value_parser = clap::value_parser!(u32).range(2..=512))]
    tile_width: u32,

    /// Height of each tile in the output image
    #[clap(default_value_t = 16, long, value_parser = clap::value_parser!(u32).range(2..=512))]
    tile_height: u32,

    /// Output width, defaults to the source width
    #[clap(long, value_parser = clap::value_parser!(u32).range(32..=20000))]
    output_width: Option<u32>,

    /// Output height, defaults to the source height
    #[clap(long, value_parser = clap::value_parser!(u32).range(32..=20000))]
    output_height: Option<u32>,

    #[clap(default_value_t = TileShape::Rect, value_enum, long, value_parser)]
    tile_shape: TileShape,

    /// Fraction of a tile's height shared by neighbouring hex rows
    #[clap(default_value_t = 0.25, long, value_parser = is_overlap)]
    hex_overlap: f64,

    /// Value between 0 and 1 controlling how far hex edges are inset
    #[clap(default_value_t = 0.2, long, value_parser = is_between_zero_and_one)]
    hex_edge_softness: f64,

    /// What shows between hex cells
    #[clap(default_value_t = HexBackground::Source, value_enum, long, value_parser)]
    hex_background: HexBackground,

    /// How tiles are fitted into their cell
    #[clap(default_value_t = FitMode::Crop, value_enum, long, value_parser)]
    fit_mode: FitMode,

    /// Tile selection strategy
    #[clap(default_value_t = Strategy::Greedy, value_enum, short, long, value_parser)]
    strategy: Strategy,

    /// Maximum number of times a single tile may be used
    #[clap(long, value_parser = clap::value_parser!(u64).range(1..))]
    max_repeats: Option<u64>,

    /// Maximum share of all cells a single tile may fill
    #[clap(long, value_parser = is_percentage)]
    max_usage_percent: Option<f64>,

    /// Probability of shuffling the lazy shortlist for a cell
    #[clap(default_value_t = 0.15, long, value_parser = is_between_zero_and_one)]
    lazy_randomness: f64,

    /// Number of nearest tiles the lazy strategy picks from
    #[clap(default_value_t = 5, long, value_parser = clap::value_parser!(u64).range(1..=200))]
    lazy_top_k: u64,

    /// Swap attempts made by the random strategy
    #[clap(default_value_t = 0, long, value_parser = clap::value_parser!(u64).range(0..=500000))]
    random_steps: u64,

    /// Replacement attempts made by the full strategy
    #[clap(default_value_t = 2000, long, value_parser = clap::value_parser!(u64).range(0..=1000000))]
    full_steps: u64,

    /// Seed for the randomised strategies
    #[clap(default_value_t = 7, long, value_parser)]
    seed: u64,

    /// Cache the tile index in the user cache directory
    #[clap(long)]
    cache: bool,

    /// Path to the tile index cache, implies --cache
    #[clap(long, value_parser)]
    cache_path: Option<PathBuf>,

    /// Recompute the tile index even if a matching cache exists
    #[clap(short, long)]
    refresh_cache: bool,
}

/// Parses str as f64 and returns the resulting value if between 0 and 1 (inclusive)
fn is_between_zero_and_one(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if (0.0..=1.0).contains(&value) {
        return Ok(value);
    }
    Err(String::from("Value must be between 0 and 1"))
}

fn is_overlap(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if (0.0..0.95).contains(&value) {
        return Ok(value);
    }
    Err(String::from("Value must be at least 0 and below 0.95"))
}

fn is_percentage(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if value > 0.0 && value <= 100.0 {
        return Ok(value);
    }
    Err(String::from("Value must be above 0 and at most 100"))
}

/// Validates that the input image path exists and is a valid image format
fn validate_input_image(path: &Path) -> Result<(), String> {
    if !path.is_file() {
        return Err(format!(
            "❌ Input image does not exist or is not a file: {}\n💡 Check the file path and ensure the file exists",
            path.display()
        ));
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()) => Ok(()),
        Some(ext) => Err(format!(
            "❌ Unsupported image format: {}\n💡 Supported formats: {}",
            ext,
            IMAGE_EXTENSIONS.join(", ")
        )),
        None => Err("❌ Input file has no extension\n💡 Please use an image file with a proper extension like .jpg or .png".to_string()),
    }
}

/// Validates that every tiles directory exists
fn validate_tiles_directories(paths: &[PathBuf]) -> Result<(), String> {
    for path in paths {
        if !path.is_dir() {
            return Err(format!(
                "❌ Tiles directory does not exist: {}\n💡 Create the directory and add image files to use as tiles",
                path.display()
            ));
        }
    }
    Ok(())
}

fn print_runtime_stats(start_time: Instant) {
    let total_secs = start_time.elapsed().as_secs_f64();

    eprintln!("📊 Runtime Statistics:");
    eprintln!("   Total execution time: {:.2}s", total_secs);
    if total_secs >= 60.0 {
        let mins = total_secs as u64 / 60;
        let secs = total_secs % 60.0;
        eprintln!("   ({} min {:.1}s)", mins, secs);
    }
}

impl Cli {
    fn into_config(self) -> MosaicConfig {
        let cache_path = match (self.cache_path, self.cache) {
            (Some(path), _) => Some(path),
            (None, true) => default_cache_path(&self.tile_dirs),
            (None, false) => None,
        };
        MosaicConfig {
            source_image: self.source_image,
            tile_dirs: self.tile_dirs,
            output_path: self.output_path,
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            output_width: self.output_width,
            output_height: self.output_height,
            tile_shape: self.tile_shape,
            hex_overlap: self.hex_overlap,
            hex_edge_softness: self.hex_edge_softness,
            hex_background: self.hex_background,
            fit_mode: self.fit_mode,
            strategy: self.strategy,
            max_repeats: self.max_repeats.map(|n| n as usize),
            max_usage_percent: self.max_usage_percent,
            lazy_randomness: self.lazy_randomness,
            lazy_top_k: self.lazy_top_k as usize,
            random_steps: self.random_steps as usize,
            full_steps: self.full_steps as usize,
            cache_path,
            refresh_cache: self.refresh_cache,
            seed: self.seed,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let cli = Cli::parse();

    validate_input_image(&cli.source_image)?;
    validate_tiles_directories(&cli.tile_dirs)?;

    let config = cli.into_config();
    if let Some(cache_path) = &config.cache_path {
        eprintln!("Using tile index cache {}", cache_path.display());
    }

    let result = build_mosaic(&config).map_err(|e| format!("❌ Build failed: {}", e))?;

    eprintln!("✓ Mosaic generation completed successfully (score {:.3})", result.score);
    eprintln!("🎉 All done! Your mosaic is ready at {}", result.output_path.display());
    print_runtime_stats(start_time);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_parsers() {
        assert_eq!(is_between_zero_and_one("0.5"), Ok(0.5));
        assert!(is_between_zero_and_one("1.5").is_err());
        assert!(is_between_zero_and_one("abc").is_err());
        assert_eq!(is_overlap("0.35"), Ok(0.35));
        assert!(is_overlap("0.95").is_err());
        assert!(is_percentage("0").is_err());
        assert_eq!(is_percentage("100"), Ok(100.0));
    }

    #[test]
    fn test_cli_maps_to_config() {
        let cli = Cli::parse_from([
            "photomosaic",
            "--source",
            "in.png",
            "--tile-dir",
            "a",
            "--tile-dir",
            "b",
            "--output",
            "out.png",
            "--tile-shape",
            "hex",
            "--strategy",
            "full",
            "--max-repeats",
            "3",
            "--cache-path",
            "index.bin",
        ]);
        let config = cli.into_config();

        assert_eq!(config.tile_dirs, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(config.tile_shape, TileShape::Hex);
        assert_eq!(config.strategy, Strategy::Full);
        assert_eq!(config.max_repeats, Some(3));
        assert_eq!(config.cache_path, Some(PathBuf::from("index.bin")));
        assert_eq!(config.fit_mode, FitMode::Crop);
        assert_eq!(config.full_steps, 2000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_rejects_out_of_range_tile_size() {
        let result = Cli::try_parse_from([
            "photomosaic",
            "--source",
            "in.png",
            "--tile-dir",
            "a",
            "--tile-width",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_tile_dir_is_required() {
        assert!(Cli::try_parse_from(["photomosaic", "--source", "in.png"]).is_err());
    }
}
