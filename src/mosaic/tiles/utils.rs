use std::path::Path;

use ::image::imageops::{self, FilterType};
use ::image::{DynamicImage, RgbImage};
use exif::In;
use exif::Tag;

use crate::mosaic::config::FitMode;
use crate::mosaic::error::ImageError;

/// Resampling filter used when fitting images into a box.
pub(crate) const FIT_FILTER: FilterType = FilterType::CatmullRom;

/// Resize `img` into exactly `size` according to `fit_mode`.
///
/// * stretch: resize ignoring the aspect ratio
/// * crop: scale to cover the box, then crop the centre
/// * pad: scale to fit inside the box and letterbox with black
pub fn fit_image(img: &DynamicImage, size: (u32, u32), fit_mode: FitMode) -> RgbImage {
    let (width, height) = size;
    match fit_mode {
        FitMode::Stretch => imageops::resize(&img.to_rgb8(), width, height, FIT_FILTER),
        FitMode::Crop => img.resize_to_fill(width, height, FIT_FILTER).to_rgb8(),
        FitMode::Pad => {
            let inner = img.resize(width, height, FIT_FILTER).to_rgb8();
            let mut boxed = RgbImage::new(width, height);
            let x = (width.saturating_sub(inner.width()) / 2) as i64;
            let y = (height.saturating_sub(inner.height()) / 2) as i64;
            imageops::replace(&mut boxed, &inner, x, y);
            boxed
        }
    }
}

/// Decode a tile, apply its EXIF orientation and fit it to `tile_size`.
pub fn prepare_tile(path: &Path, tile_size: (u32, u32), fit_mode: FitMode) -> Result<RgbImage, ImageError> {
    let img = ::image::open(path).map_err(|error| ImageError {
        path: path.to_owned(),
        error,
    })?;
    let orientation = get_jpeg_orientation(path).unwrap_or(1);
    let img = rotate(img, orientation);
    Ok(fit_image(&img, tile_size, fit_mode))
}

fn get_jpeg_orientation(file_path: &Path) -> Result<u32, exif::Error> {
    let file = std::fs::File::open(file_path)?;
    let mut bufreader = std::io::BufReader::new(&file);
    let exifreader = exif::Reader::new();
    let exif = exifreader.read_from_container(&mut bufreader)?;
    let orientation: u32 = match exif.get_field(Tag::Orientation, In::PRIMARY) {
        Some(orientation) => match orientation.value.get_uint(0) {
            Some(v @ 1..=8) => v,
            _ => 1,
        },
        None => 1,
    };

    Ok(orientation)
}

fn rotate(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}
