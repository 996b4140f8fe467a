use super::config::TileShape;

/// Cell positions in canonical order plus the overall canvas size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    pub positions: Vec<(u32, u32)>,
    pub canvas_size: (u32, u32),
}

impl LayoutPlan {
    pub fn len(&self) -> usize {
        self.positions.len()
    }
}

/// Computes the cell layout for a mosaic.
///
/// Rectangular cells tile the canvas row-major. Hexagonal cells step down by
/// `tile_h * (1 - overlap)` and shift every odd row right by half a tile, so
/// the canvas gains half a tile of width.
pub fn compute_layout(
    source_size: (u32, u32),
    tile_size: (u32, u32),
    shape: TileShape,
    hex_overlap: f64,
    output_size: (Option<u32>, Option<u32>),
) -> LayoutPlan {
    let (tile_w, tile_h) = (i64::from(tile_size.0.max(1)), i64::from(tile_size.1.max(1)));
    let out_w = i64::from(output_size.0.unwrap_or(source_size.0));
    let out_h = i64::from(output_size.1.unwrap_or(source_size.1));

    match shape {
        TileShape::Rect => {
            let cols = out_w.div_euclid(tile_w).max(1);
            let rows = out_h.div_euclid(tile_h).max(1);
            let positions = (0..rows)
                .flat_map(|row| (0..cols).map(move |col| (col * tile_w, row * tile_h)))
                .map(|(x, y)| (x as u32, y as u32))
                .collect();
            LayoutPlan {
                positions,
                canvas_size: ((cols * tile_w) as u32, (rows * tile_h) as u32),
            }
        }
        TileShape::Hex => {
            let half_w = tile_w / 2;
            let v_step = ((tile_h as f64 * (1.0 - hex_overlap)).round_ties_even() as i64).max(1);
            let cols = (out_w - half_w).div_euclid(tile_w).max(1);
            let rows = if out_h > tile_h {
                ((out_h - tile_h).div_euclid(v_step) + 1).max(1)
            } else {
                1
            };

            let mut positions = Vec::with_capacity((rows * cols) as usize);
            for row in 0..rows {
                let x_offset = if row % 2 == 1 { half_w } else { 0 };
                let y = row * v_step;
                for col in 0..cols {
                    positions.push(((x_offset + col * tile_w) as u32, y as u32));
                }
            }

            let width = cols * tile_w + half_w;
            let height = tile_h + (rows - 1) * v_step;
            LayoutPlan {
                positions,
                canvas_size: (width as u32, height as u32),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_layout() {
        let plan = compute_layout((64, 64), (16, 16), TileShape::Rect, 0.0, (None, None));
        assert_eq!(plan.len(), 16);
        assert_eq!(plan.canvas_size, (64, 64));
        assert_eq!(plan.positions[0], (0, 0));
        assert_eq!(plan.positions[1], (16, 0));
        assert_eq!(plan.positions[4], (0, 16));
        assert_eq!(plan.positions[15], (48, 48));
    }

    #[test]
    fn test_rect_layout_truncates_partial_cells() {
        let plan = compute_layout((70, 50), (16, 16), TileShape::Rect, 0.0, (None, None));
        assert_eq!(plan.len(), 4 * 3);
        assert_eq!(plan.canvas_size, (64, 48));
    }

    #[test]
    fn test_output_size_override() {
        let plan = compute_layout((10, 10), (8, 8), TileShape::Rect, 0.0, (Some(40), Some(24)));
        assert_eq!(plan.canvas_size, (40, 24));
        assert_eq!(plan.len(), 15);
    }

    #[test]
    fn test_degenerate_sizes_clamp_to_one_cell() {
        let plan = compute_layout((4, 4), (16, 16), TileShape::Rect, 0.0, (None, None));
        assert_eq!(plan.positions, vec![(0, 0)]);
        assert_eq!(plan.canvas_size, (16, 16));

        let plan = compute_layout((4, 4), (16, 16), TileShape::Hex, 0.25, (None, None));
        assert_eq!(plan.positions, vec![(0, 0)]);
        assert_eq!(plan.canvas_size, (24, 16));
    }

    #[test]
    fn test_hex_layout() {
        let plan = compute_layout((96, 96), (20, 20), TileShape::Hex, 0.35, (None, None));
        // v = round(20 * 0.65) = 13, cols = (96 - 10) / 20 = 4, rows = (96 - 20) / 13 + 1 = 6
        assert_eq!(plan.len(), 4 * 6);
        assert_eq!(plan.canvas_size, (4 * 20 + 10, 20 + 5 * 13));
        assert_eq!(plan.positions[0], (0, 0));
        assert_eq!(plan.positions[3], (60, 0));
        assert_eq!(plan.positions[4], (10, 13));
        assert_eq!(plan.positions[8], (0, 26));
        let (last_x, last_y) = plan.positions[23];
        assert_eq!((last_x + 20, last_y + 20), plan.canvas_size);
    }

    #[test]
    fn test_hex_vertical_step_never_zero() {
        let plan = compute_layout((40, 40), (2, 2), TileShape::Hex, 0.9, (None, None));
        // round(0.2) = 0 clamps to 1
        assert_eq!(plan.len(), 19 * 39);
        assert_eq!(plan.canvas_size, (39, 40));
        assert_eq!(plan.positions[19], (1, 1));
    }
}
