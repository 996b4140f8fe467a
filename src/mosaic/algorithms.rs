//! Assignment of tiles to cells.
//!
//! Every strategy returns one tile index per cell, in layout order. Tiles are
//! ranked by squared RGB distance to the cell color, ties broken by tile
//! index, so rankings are total and reproducible. Randomised strategies draw
//! from the generator they are handed and nothing else.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use super::color::{squared_distance, AvgColor};
use super::error::MosaicError;
use super::progress_bar;

/// Tiles considered per step by [`full_optimize`].
pub const SHORTLIST_SIZE: usize = 20;

/// One tile index per layout position.
pub type Assignment = Vec<usize>;

/// Usage constraints for a build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionContext {
    pub max_repeats: Option<usize>,
    pub max_usage_percent: Option<f64>,
    pub total_cells: usize,
}

impl SelectionContext {
    /// The tightest of the configured caps, `None` when unlimited.
    ///
    /// A percentage cap never drops below one use.
    pub fn usage_limit(&self) -> Option<usize> {
        let from_percent = self
            .max_usage_percent
            .map(|percent| ((percent / 100.0 * self.total_cells as f64).floor() as usize).max(1));
        match (self.max_repeats, from_percent) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// Per-tile usage counts for a single strategy run.
struct Usage {
    counts: HashMap<usize, usize>,
    limit: Option<usize>,
}

impl Usage {
    fn new(limit: Option<usize>) -> Self {
        Usage {
            counts: HashMap::new(),
            limit,
        }
    }

    fn from_assignment(assignment: &[usize], limit: Option<usize>) -> Self {
        let mut usage = Usage::new(limit);
        for &idx in assignment {
            usage.add(idx);
        }
        usage
    }

    fn count(&self, idx: usize) -> usize {
        self.counts.get(&idx).copied().unwrap_or(0)
    }

    fn has_room(&self, idx: usize) -> bool {
        self.limit.map_or(true, |limit| self.count(idx) < limit)
    }

    fn add(&mut self, idx: usize) {
        *self.counts.entry(idx).or_default() += 1;
    }

    fn remove(&mut self, idx: usize) {
        if let Some(count) = self.counts.get_mut(&idx) {
            *count = count.saturating_sub(1);
        }
    }
}

/// Mean squared distance between each cell color and its assigned tile.
/// Lower is better.
pub fn score(assignment: &[usize], cell_colors: &[AvgColor], palette: &[AvgColor]) -> f64 {
    if assignment.is_empty() {
        return 0.0;
    }
    total_distance(assignment, cell_colors, palette) / assignment.len() as f64
}

fn total_distance(assignment: &[usize], cell_colors: &[AvgColor], palette: &[AvgColor]) -> f64 {
    assignment
        .iter()
        .zip(cell_colors)
        .map(|(&idx, color)| squared_distance(color, &palette[idx]))
        .sum()
}

/// Tile indices ordered from nearest to farthest.
pub fn rank(color: &AvgColor, palette: &[AvgColor]) -> Vec<usize> {
    let distances: Vec<f64> = palette.iter().map(|tile| squared_distance(color, tile)).collect();
    let mut order: Vec<usize> = (0..palette.len()).collect();
    order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]).then(a.cmp(&b)));
    order
}

/// The single nearest tile. The palette must not be empty.
fn nearest(color: &AvgColor, palette: &[AvgColor]) -> usize {
    palette
        .iter()
        .enumerate()
        .map(|(idx, tile)| (idx, squared_distance(color, tile)))
        .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
        .0
}

fn ensure_palette(palette: &[AvgColor]) -> Result<(), MosaicError> {
    if palette.is_empty() {
        return Err(MosaicError::NoTilesFound);
    }
    Ok(())
}

/// Picks, for each cell in order, the nearest tile still under the usage cap.
///
/// When every tile is at the cap the globally nearest tile is used anyway, so
/// the cap can be exceeded in that case.
pub fn greedy(
    cell_colors: &[AvgColor],
    palette: &[AvgColor],
    ctx: &SelectionContext,
) -> Result<Assignment, MosaicError> {
    ensure_palette(palette)?;
    let mut usage = Usage::new(ctx.usage_limit());

    let assignment = cell_colors
        .iter()
        .map(|color| {
            let idx = rank(color, palette)
                .into_iter()
                .find(|&idx| usage.has_room(idx))
                .unwrap_or_else(|| nearest(color, palette));
            usage.add(idx);
            idx
        })
        .collect();
    Ok(assignment)
}

/// Like [`greedy`] but chooses among the `top_k` nearest tiles, visiting them
/// in random order with probability `randomness`.
///
/// Falls back to the nearest tile under the cap outside the shortlist, then
/// to the nearest tile overall.
pub fn lazy(
    cell_colors: &[AvgColor],
    palette: &[AvgColor],
    ctx: &SelectionContext,
    top_k: usize,
    randomness: f64,
    rng: &mut impl Rng,
) -> Result<Assignment, MosaicError> {
    ensure_palette(palette)?;
    let mut usage = Usage::new(ctx.usage_limit());
    let shortlist_len = top_k.clamp(1, palette.len());

    let mut assignment = Vec::with_capacity(cell_colors.len());
    for color in cell_colors {
        let ranked = rank(color, palette);
        let mut shortlist = ranked[..shortlist_len].to_vec();
        if rng.gen::<f64>() < randomness {
            shortlist.shuffle(rng);
        }

        let idx = shortlist
            .into_iter()
            .find(|&idx| usage.has_room(idx))
            .or_else(|| ranked.iter().copied().find(|&idx| usage.has_room(idx)))
            .unwrap_or(ranked[0]);
        usage.add(idx);
        assignment.push(idx);
    }
    Ok(assignment)
}

/// Random pairwise swaps, kept only when they strictly lower the score.
///
/// Swaps leave usage counts untouched, so any cap satisfied by `initial`
/// still holds.
pub fn random_improve(
    cell_colors: &[AvgColor],
    palette: &[AvgColor],
    initial: Assignment,
    steps: usize,
    rng: &mut impl Rng,
) -> Assignment {
    let cells = initial.len();
    if steps == 0 || cells < 2 {
        return initial;
    }

    let mut assignment = initial;
    let mut best = assignment.clone();
    let mut best_total = total_distance(&best, cell_colors, palette);
    let mut total = best_total;
    let distance = |cell: usize, idx: usize| squared_distance(&cell_colors[cell], &palette[idx]);

    let pb = progress_bar(steps as u64, "Swapping tiles");
    for _ in 0..steps {
        pb.inc(1);
        let i = rng.gen_range(0, cells);
        let j = rng.gen_range(0, cells);
        if i == j || assignment[i] == assignment[j] {
            continue;
        }

        let (a, b) = (assignment[i], assignment[j]);
        let delta = distance(i, b) + distance(j, a) - distance(i, a) - distance(j, b);
        if total + delta < best_total {
            assignment.swap(i, j);
            total += delta;
            best_total = total;
            best.clone_from(&assignment);
        }
    }
    pb.finish_and_clear();
    best
}

/// Local search replacing one cell at a time with a random pick from the
/// [`SHORTLIST_SIZE`] tiles nearest to it.
///
/// Replacements that would break the usage cap are rejected. Others are
/// accepted when the score does not increase. Returns the best assignment
/// seen.
pub fn full_optimize(
    cell_colors: &[AvgColor],
    palette: &[AvgColor],
    initial: Assignment,
    ctx: &SelectionContext,
    steps: usize,
    rng: &mut impl Rng,
) -> Assignment {
    let cells = initial.len();
    if steps == 0 || cells == 0 || palette.is_empty() {
        return initial;
    }

    let mut assignment = initial;
    let mut usage = Usage::from_assignment(&assignment, ctx.usage_limit());
    let mut total = total_distance(&assignment, cell_colors, palette);
    let mut best = assignment.clone();
    let mut best_total = total;
    let mut shortlists: Vec<Option<Vec<usize>>> = vec![None; cells];

    let pb = progress_bar(steps as u64, "Optimising");
    for _ in 0..steps {
        pb.inc(1);
        let pos = rng.gen_range(0, cells);
        let old = assignment[pos];

        let shortlist = shortlists[pos].get_or_insert_with(|| {
            let mut ranked = rank(&cell_colors[pos], palette);
            ranked.truncate(SHORTLIST_SIZE);
            ranked
        });
        let candidate = match shortlist.choose(rng) {
            Some(&candidate) => candidate,
            None => continue,
        };
        if candidate == old || !usage.has_room(candidate) {
            continue;
        }

        let color = &cell_colors[pos];
        let delta = squared_distance(color, &palette[candidate]) - squared_distance(color, &palette[old]);
        if delta <= 0.0 {
            assignment[pos] = candidate;
            usage.remove(old);
            usage.add(candidate);
            total += delta;
            if total < best_total {
                best_total = total;
                best.clone_from(&assignment);
            }
        }
    }
    pb.finish_and_clear();
    best
}
