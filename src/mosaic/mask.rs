use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

/// The polygon is rasterised at this multiple of the target size.
const SUPERSAMPLE: u32 = 4;

/// Inset of the hexagon at full edge softness, as a fraction of each dimension.
const MAX_INSET: f64 = 0.08;

type MaskKey = (u32, u32, u32);

static HEX_MASKS: OnceLock<RwLock<HashMap<MaskKey, Arc<GrayImage>>>> = OnceLock::new();

/// Maps an edge softness in `[0, 1]` to its inset bucket, in thousandths.
fn softness_bucket(edge_softness: f64) -> u32 {
    let inset = edge_softness.clamp(0.0, 1.0) * MAX_INSET;
    (inset * 1000.0).round() as u32
}

/// Opacity mask shaping a `width`x`height` tile into a hexagon with
/// anti-aliased edges.
///
/// Masks depend only on their size and softness bucket and are shared for
/// the lifetime of the process.
pub fn hex_mask(size: (u32, u32), edge_softness: f64) -> Arc<GrayImage> {
    let key = (size.0, size.1, softness_bucket(edge_softness));
    let masks = HEX_MASKS.get_or_init(|| RwLock::new(HashMap::new()));

    if let Some(mask) = masks.read().ok().and_then(|m| m.get(&key).cloned()) {
        return mask;
    }

    let mask = Arc::new(render_hex_mask(key));
    match masks.write() {
        Ok(mut m) => m.entry(key).or_insert(mask).clone(),
        Err(_) => mask,
    }
}

fn render_hex_mask((width, height, bucket): MaskKey) -> GrayImage {
    let inset = f64::from(bucket) / 1000.0;
    let (w, h) = (f64::from(width), f64::from(height));

    let x_min = inset * w;
    let x_max = w - x_min;
    let y_min = inset * h;
    let y_max = h - y_min;
    let y_upper = y_min + (y_max - y_min) * 0.25;
    let y_lower = y_min + (y_max - y_min) * 0.75;

    let (large_w, large_h) = (width * SUPERSAMPLE, height * SUPERSAMPLE);
    let scale = f64::from(SUPERSAMPLE);
    let to_point = |(x, y): (f64, f64)| {
        let px = (x * scale).round().clamp(0.0, f64::from(large_w.saturating_sub(1)));
        let py = (y * scale).round().clamp(0.0, f64::from(large_h.saturating_sub(1)));
        Point::new(px as i32, py as i32)
    };
    let points: Vec<Point<i32>> = [
        (w * 0.5, y_min),
        (x_max, y_upper),
        (x_max, y_lower),
        (w * 0.5, y_max),
        (x_min, y_lower),
        (x_min, y_upper),
    ]
    .into_iter()
    .map(to_point)
    .collect();

    let mut large = GrayImage::new(large_w, large_h);
    draw_polygon_mut(&mut large, &points, Luma([255u8]));
    imageops::resize(&large, width, height, FilterType::Lanczos3)
}
