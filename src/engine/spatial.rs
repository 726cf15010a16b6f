//! Uniform grid binning for pair searches under a distance ceiling.

use std::collections::HashMap;

/// Grid-based spatial index over a fixed set of positions.
///
/// Space is divided into cubic bins of the query cutoff, so every
/// neighbour within the cutoff lies in one of the 27 bins around a point.
#[derive(Debug)]
pub struct SpatialGrid {
    inv_cell_size: f64,
    cells: HashMap<(i64, i64, i64), Vec<usize>>,
}

impl SpatialGrid {
    /// Creates a grid populated with `positions`, indexed by slice position.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size <= 0.0`.
    pub fn from_positions(positions: &[[f64; 3]], cell_size: f64) -> Self {
        assert!(cell_size > 0.0, "Cell size must be positive");
        let mut grid = Self {
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
        };
        for (idx, pos) in positions.iter().enumerate() {
            let cell = grid.cell_coords(*pos);
            grid.cells.entry(cell).or_default().push(idx);
        }
        grid
    }

    fn cell_coords(&self, pos: [f64; 3]) -> (i64, i64, i64) {
        (
            (pos[0] * self.inv_cell_size).floor() as i64,
            (pos[1] * self.inv_cell_size).floor() as i64,
            (pos[2] * self.inv_cell_size).floor() as i64,
        )
    }

    fn neighbours(&self, pos: [f64; 3]) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy, cz) = self.cell_coords(pos);
        (-1..=1)
            .flat_map(move |dx| (-1..=1).flat_map(move |dy| (-1..=1).map(move |dz| (dx, dy, dz))))
            .filter_map(move |(dx, dy, dz)| self.cells.get(&(cx + dx, cy + dy, cz + dz)))
            .flatten()
            .copied()
    }

    /// Every index pair `(i, j)` with `i < j` closer than `cutoff`, sorted.
    pub fn pairs_within(&self, positions: &[[f64; 3]], cutoff: f64) -> Vec<(usize, usize)> {
        let cutoff_sq = cutoff * cutoff;
        let mut pairs = Vec::new();
        for (i, pos) in positions.iter().enumerate() {
            for j in self.neighbours(*pos) {
                if j > i && distance_sq(*pos, positions[j]) <= cutoff_sq {
                    pairs.push((i, j));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }
}

#[inline]
pub(crate) fn distance_sq(a: [f64; 3], b: [f64; 3]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}
