use std::collections::HashMap;

use ::image::{imageops, DynamicImage, GrayImage, Rgba, RgbImage, RgbaImage};

use super::config::FitMode;
use super::error::ImageError;
use super::layout::LayoutPlan;
use super::progress_bar;
use super::tiles::{prepare_tile, TileSet};

/// Paints the chosen tiles onto the canvas.
///
/// The canvas starts as `background` when given (it must match the layout's
/// canvas size) and black otherwise. Each tile is fitted once, however often
/// it repeats. With a `mask`, tiles are blended through it; without one they
/// are pasted opaque.
pub fn render(
    assignment: &[usize],
    tile_set: &TileSet,
    layout: &LayoutPlan,
    tile_size: (u32, u32),
    fit_mode: FitMode,
    mask: Option<&GrayImage>,
    background: Option<&RgbImage>,
) -> Result<RgbImage, ImageError> {
    let (width, height) = layout.canvas_size;
    let mut canvas = match background {
        Some(background) if background.dimensions() == layout.canvas_size => {
            DynamicImage::ImageRgb8(background.clone()).to_rgba8()
        }
        _ => RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])),
    };

    let pb = progress_bar(assignment.len() as u64, "Rendering");
    let mut fitted: HashMap<usize, RgbaImage> = HashMap::new();
    for (&idx, &(x, y)) in assignment.iter().zip(layout.positions.iter()) {
        pb.inc(1);
        if !fitted.contains_key(&idx) {
            let tile_img = prepare_tile(tile_set.get_path(idx), tile_size, fit_mode)?;
            fitted.insert(idx, with_alpha(&tile_img, mask));
        }
        if let Some(tile_img) = fitted.get(&idx) {
            match mask {
                Some(_) => imageops::overlay(&mut canvas, tile_img, i64::from(x), i64::from(y)),
                None => imageops::replace(&mut canvas, tile_img, i64::from(x), i64::from(y)),
            }
        }
    }
    pb.finish_and_clear();

    Ok(DynamicImage::ImageRgba8(canvas).to_rgb8())
}

/// Attach `mask` as the alpha channel, or full opacity without one.
fn with_alpha(img: &RgbImage, mask: Option<&GrayImage>) -> RgbaImage {
    RgbaImage::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y);
        let alpha = mask
            .filter(|mask| x < mask.width() && y < mask.height())
            .map_or(255, |mask| mask.get_pixel(x, y)[0]);
        Rgba([p[0], p[1], p[2], alpha])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mosaic::config::TileShape;
    use crate::mosaic::layout::compute_layout;
    use crate::mosaic::mask::hex_mask;
    use crate::mosaic::tiles::Tile;
    use ::image::Rgb;
    use std::path::Path;

    fn write_tile(dir: &Path, name: &str, color: [u8; 3]) -> Tile {
        let path = dir.join(name);
        RgbImage::from_pixel(12, 12, Rgb(color)).save(&path).unwrap();
        Tile::new(path, [f64::from(color[0]), f64::from(color[1]), f64::from(color[2])])
    }

    #[test]
    fn test_render_rect_places_tiles_in_layout_order() {
        let dir = tempfile::tempdir().unwrap();
        let tile_set = TileSet::from_tiles(vec![
            write_tile(dir.path(), "r.png", [255, 0, 0]),
            write_tile(dir.path(), "b.png", [0, 0, 255]),
        ]);
        let layout = compute_layout((16, 8), (8, 8), TileShape::Rect, 0.0, (None, None));

        let output = render(&[1, 0], &tile_set, &layout, (8, 8), FitMode::Crop, None, None).unwrap();

        assert_eq!(output.dimensions(), (16, 8));
        assert_eq!(*output.get_pixel(3, 3), Rgb([0, 0, 255]));
        assert_eq!(*output.get_pixel(12, 3), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_render_hex_shows_background_in_corners() {
        let dir = tempfile::tempdir().unwrap();
        let tile_set = TileSet::from_tiles(vec![write_tile(dir.path(), "g.png", [0, 255, 0])]);
        let layout = compute_layout((40, 40), (20, 20), TileShape::Hex, 0.25, (None, None));
        let background = RgbImage::from_pixel(layout.canvas_size.0, layout.canvas_size.1, Rgb([200, 200, 200]));
        let mask = hex_mask((20, 20), 0.2);
        let assignment = vec![0; layout.len()];

        let output = render(
            &assignment,
            &tile_set,
            &layout,
            (20, 20),
            FitMode::Crop,
            Some(&mask),
            Some(&background),
        )
        .unwrap();

        assert_eq!(output.dimensions(), layout.canvas_size);
        assert_eq!(*output.get_pixel(10, 10), Rgb([0, 255, 0]));
        // top-left corner of the first hexagon is (almost) transparent
        let corner = output.get_pixel(0, 0);
        assert!(corner[0] > 180 && corner[2] > 180);
    }

    #[test]
    fn test_render_fails_on_missing_tile_file() {
        let tile_set = TileSet::from_tiles(vec![Tile::new("does/not/exist.png".into(), [0.0; 3])]);
        let layout = compute_layout((8, 8), (8, 8), TileShape::Rect, 0.0, (None, None));

        assert!(render(&[0], &tile_set, &layout, (8, 8), FitMode::Crop, None, None).is_err());
    }
}
