use itertools::Itertools;

use super::color::{squared_distance, AvgColor};
use super::tiles::TileSet;

/// Per-cell match quality of a finished assignment.
#[derive(Clone, Debug)]
pub struct RenderStats {
    /// (tile index, squared distance) for every cell, in layout order
    cells: Vec<(usize, f64)>,
}

impl RenderStats {
    pub fn new(assignment: &[usize], cell_colors: &[AvgColor], palette: &[AvgColor]) -> Self {
        let cells = assignment
            .iter()
            .zip(cell_colors)
            .map(|(&idx, color)| (idx, squared_distance(color, &palette[idx])))
            .collect();
        RenderStats { cells }
    }

    pub fn tile_count(&self) -> usize {
        self.cells.len()
    }

    pub fn unique_tiles(&self) -> usize {
        self.cells.iter().map(|(idx, _)| idx).unique().count()
    }

    /// Mean squared distance, equal to the assignment score.
    pub fn mean_distance(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.cells.iter().map(|(_, d)| d).sum::<f64>() / self.cells.len() as f64
    }

    /// Most used tiles first, ties by tile index.
    pub fn most_used(&self, n: usize) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .map(|(idx, _)| *idx)
            .counts()
            .into_iter()
            .sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)))
            .take(n)
            .collect()
    }

    /// Worst matching cells first, as (cell, tile index, distance).
    pub fn worst_matches(&self, n: usize) -> Vec<(usize, usize, f64)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(cell, &(idx, d))| (cell, idx, d))
            .sorted_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)))
            .take(n)
            .collect()
    }

    /// Print a summary of the match quality.
    pub fn summarise(&self, tile_set: &TileSet) {
        if self.cells.is_empty() {
            eprintln!("No tiles recorded in statistics");
            return;
        }

        eprintln!("Mosaic Statistics:");
        eprintln!("  Total tiles placed: {}", self.tile_count());
        eprintln!("  Unique images used: {}", self.unique_tiles());
        eprintln!("  Average color distance: {:.3}", self.mean_distance());

        eprintln!("\nTop 10 most used tiles:");
        for (i, (idx, count)) in self.most_used(10).into_iter().enumerate() {
            eprintln!("  {}. {} ({} times)", i + 1, tile_set.get_path(idx).display(), count);
        }

        eprintln!("\nWorst 10 color matches:");
        for (i, (cell, idx, distance)) in self.worst_matches(10).into_iter().enumerate() {
            eprintln!(
                "  {}. cell {}: {} (distance: {:.1})",
                i + 1,
                cell,
                tile_set.get_path(idx).display(),
                distance
            );
        }
    }
}
