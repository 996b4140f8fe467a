use image::{GrayImage, RgbImage};

/// Mean red, green and blue of a set of pixels.
pub type AvgColor = [f64; 3];

/// Total weights below this are treated as an empty mask.
const MIN_TOTAL_WEIGHT: f64 = 1e-9;

/// Calculate the unweighted mean color of every pixel in an RGB image.
///
/// An empty image averages to black.
pub fn average_color(img: &RgbImage) -> AvgColor {
    let pixel_count = u64::from(img.width()) * u64::from(img.height());
    if pixel_count == 0 {
        return [0.0; 3];
    }

    let mut sums = [0u64; 3];
    for pixel in img.pixels() {
        for (sum, channel) in sums.iter_mut().zip(pixel.0.iter()) {
            *sum += u64::from(*channel);
        }
    }

    let count = pixel_count as f64;
    [
        sums[0] as f64 / count,
        sums[1] as f64 / count,
        sums[2] as f64 / count,
    ]
}

/// Calculate the mean color of `img` with each pixel weighted by `mask / 255`.
///
/// Falls back to [`average_color`] when the mask has (almost) no weight.
/// The mask must have the same dimensions as the image.
pub fn average_color_masked(img: &RgbImage, mask: &GrayImage) -> AvgColor {
    debug_assert_eq!(img.dimensions(), mask.dimensions());

    let mut sums = [0f64; 3];
    let mut total_weight = 0f64;
    for (pixel, weight) in img.pixels().zip(mask.pixels()) {
        let weight = f64::from(weight[0]) / 255.0;
        total_weight += weight;
        for (sum, channel) in sums.iter_mut().zip(pixel.0.iter()) {
            *sum += f64::from(*channel) * weight;
        }
    }

    if total_weight <= MIN_TOTAL_WEIGHT {
        return average_color(img);
    }
    [
        sums[0] / total_weight,
        sums[1] / total_weight,
        sums[2] / total_weight,
    ]
}

/// Squared euclidean distance between two colors in RGB space.
pub fn squared_distance(a: &AvgColor, b: &AvgColor) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
