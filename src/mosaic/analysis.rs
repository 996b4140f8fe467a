use ::image::{imageops, GrayImage, RgbImage};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use super::color::{average_color, average_color_masked, AvgColor};
use super::layout::LayoutPlan;

/// Average source color of every cell, in layout order.
///
/// `source_img` must already be resized to the layout's canvas. Each patch
/// is `tile_size` and is shifted back inside the canvas if it would overrun
/// it. With a mask (hex cells) pixels are weighted by opacity.
pub fn sample_cell_colors(
    source_img: &RgbImage,
    layout: &LayoutPlan,
    tile_size: (u32, u32),
    mask: Option<&GrayImage>,
) -> Vec<AvgColor> {
    let (tile_w, tile_h) = tile_size;
    let max_x = source_img.width().saturating_sub(tile_w);
    let max_y = source_img.height().saturating_sub(tile_h);

    layout
        .positions
        .par_iter()
        .map(|&(x, y)| {
            let patch = imageops::crop_imm(source_img, x.min(max_x), y.min(max_y), tile_w, tile_h).to_image();
            match mask {
                Some(mask) if mask.dimensions() == patch.dimensions() => average_color_masked(&patch, mask),
                _ => average_color(&patch),
            }
        })
        .collect()
}
