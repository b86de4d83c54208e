//! Uniform-grid bucketing for neighbour queries.

use std::collections::HashMap;

use glam::DVec2;

/// Buckets point indices by grid cell so that proximity queries only scan
/// the 3x3 block of cells around a point.
#[derive(Debug)]
pub struct SpatialHash {
    cell_size: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialHash {
    /// Builds a hash over `points`; a non-positive `cell_size` is treated as 1.
    pub fn build<'a>(cell_size: f64, points: impl IntoIterator<Item = &'a DVec2>) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { 1.0 };
        let mut cells: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (i, p) in points.into_iter().enumerate() {
            cells.entry(Self::key(cell_size, *p)).or_default().push(i);
        }
        Self { cell_size, cells }
    }

    fn key(cell_size: f64, p: DVec2) -> (i64, i64) {
        (
            (p.x / cell_size).floor() as i64,
            (p.y / cell_size).floor() as i64,
        )
    }

    /// Indices in the cell containing `p` and its eight neighbours.
    ///
    /// Every point within `cell_size` of `p` is included, plus some further away.
    pub fn near(&self, p: DVec2) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = Self::key(self.cell_size, p);
        (-1..=1)
            .flat_map(move |dy| (-1..=1).map(move |dx| (cx + dx, cy + dy)))
            .filter_map(|k| self.cells.get(&k))
            .flatten()
            .copied()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
