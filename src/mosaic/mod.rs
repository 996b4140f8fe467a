pub mod algorithms;
pub mod analysis;
pub mod cache;
pub mod color;
pub mod config;
pub mod error;
pub mod image;
pub mod layout;
pub mod mask;
pub mod rendering;
pub mod stats;
pub mod tiles;

use std::fs::create_dir_all;
use std::path::PathBuf;

use ::image::imageops::{self, FilterType};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;

use algorithms::{Assignment, SelectionContext};
use analysis::sample_cell_colors;
use config::{HexBackground, MosaicConfig, Strategy, TileShape};
use error::MosaicError;
use layout::compute_layout;
use mask::hex_mask;
use stats::RenderStats;
use tiles::{IndexSettings, TileSet};

const PROGRESS_TEMPLATE: &str = "{msg} {wide_bar} {pos}/{len} ({per_sec})";

pub(crate) fn progress_bar(len: u64, msg: &'static str) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len).with_message(msg).with_style(style)
}

/// Result of a mosaic build.
pub struct MosaicResult {
    pub output_path: PathBuf,
    /// Tile index per layout position
    pub assignment: Assignment,
    pub tile_set: TileSet,
    pub score: f64,
}

/// Build a mosaic as described by `config` and write it to its output path.
pub fn build_mosaic(config: &MosaicConfig) -> Result<MosaicResult, MosaicError> {
    config.validate()?;
    let tile_size = config.tile_size();

    eprintln!("Opening source image: {}", config.source_image.display());
    let source = ::image::open(&config.source_image)
        .map_err(|error| MosaicError::SourceImage {
            path: config.source_image.clone(),
            error,
        })?
        .to_rgb8();

    let layout = compute_layout(
        source.dimensions(),
        tile_size,
        config.tile_shape,
        config.hex_overlap,
        (config.output_width, config.output_height),
    );
    let (canvas_w, canvas_h) = layout.canvas_size;
    eprintln!(
        "Placing {} cells on a {}x{} canvas (source {}x{})",
        layout.len(),
        canvas_w,
        canvas_h,
        source.width(),
        source.height()
    );
    let source = imageops::resize(&source, canvas_w, canvas_h, FilterType::CatmullRom);

    let mask = match config.tile_shape {
        TileShape::Hex => Some(hex_mask(tile_size, config.hex_edge_softness)),
        TileShape::Rect => None,
    };
    let cell_colors = sample_cell_colors(&source, &layout, tile_size, mask.as_deref());

    let settings = IndexSettings {
        tile_size,
        fit_mode: config.fit_mode,
        shape: config.tile_shape,
        edge_softness: config.hex_edge_softness,
    };
    let tile_set = TileSet::build(
        &config.tile_dirs,
        &settings,
        config.cache_path.as_deref(),
        config.refresh_cache,
    )?;
    if tile_set.is_empty() {
        return Err(MosaicError::NoTilesFound);
    }
    eprintln!("Tile set with {} tiles", tile_set.len());

    let palette = tile_set.palette();
    let ctx = SelectionContext {
        max_repeats: config.max_repeats,
        max_usage_percent: config.max_usage_percent,
        total_cells: layout.len(),
    };
    let assignment = assign(config, &ctx, &cell_colors, &palette)?;
    let score = algorithms::score(&assignment, &cell_colors, &palette);

    RenderStats::new(&assignment, &cell_colors, &palette).summarise(&tile_set);

    let background = match (config.tile_shape, config.hex_background) {
        (TileShape::Hex, HexBackground::Source) => Some(&source),
        _ => None,
    };
    let output = rendering::render(
        &assignment,
        &tile_set,
        &layout,
        tile_size,
        config.fit_mode,
        mask.as_deref(),
        background,
    )?;

    let output_path = config.output_path.clone();
    let write_failed = |error: ::image::ImageError| MosaicError::OutputWrite {
        path: output_path.clone(),
        error,
    };
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).map_err(|e| write_failed(::image::ImageError::IoError(e)))?;
    }
    eprintln!("Writing output file to {}", output_path.display());
    output.save(&output_path).map_err(write_failed)?;

    Ok(MosaicResult {
        output_path,
        assignment,
        tile_set,
        score,
    })
}

/// Run the configured strategy. Each randomised stage gets its own
/// generator seeded from the config.
fn assign(
    config: &MosaicConfig,
    ctx: &SelectionContext,
    cell_colors: &[color::AvgColor],
    palette: &[color::AvgColor],
) -> Result<Assignment, MosaicError> {
    let rng = || StdRng::seed_from_u64(config.seed);

    let initial = match config.strategy {
        Strategy::Lazy => algorithms::lazy(
            cell_colors,
            palette,
            ctx,
            config.lazy_top_k,
            config.lazy_randomness,
            &mut rng(),
        )?,
        _ => algorithms::greedy(cell_colors, palette, ctx)?,
    };

    Ok(match config.strategy {
        Strategy::Random => {
            algorithms::random_improve(cell_colors, palette, initial, config.random_steps, &mut rng())
        }
        Strategy::Full => {
            algorithms::full_optimize(cell_colors, palette, initial, ctx, config.full_steps, &mut rng())
        }
        Strategy::Greedy | Strategy::Lazy => initial,
    })
}
