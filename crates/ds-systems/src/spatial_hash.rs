//! Uniform-grid spatial hash for neighbour queries.

use std::collections::HashMap;

/// Buckets particle indices by floored cell coordinates. Cell size should
/// equal the interaction radius so a 3x3 cell scan covers every neighbour.
/// Rebuilt every step; bucket allocations are reused across rebuilds.
#[derive(Debug, Default)]
pub struct SpatialHash {
    cell: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialHash {
    pub fn new(cell: f64) -> Self {
        Self {
            cell,
            cells: HashMap::new(),
        }
    }

    fn key(&self, x: f64, y: f64) -> (i64, i64) {
        (
            (x / self.cell).floor() as i64,
            (y / self.cell).floor() as i64,
        )
    }

    /// Clear and re-bucket `positions`.
    pub fn rebuild<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        for (i, (x, y)) in positions.into_iter().enumerate() {
            self.cells.entry(self.key(x, y)).or_default().push(i);
        }
    }

    /// Visit every particle index in the 3x3 cell block around `(x, y)`.
    pub fn for_neighbors<F: FnMut(usize)>(&self, x: f64, y: f64, mut f: F) {
        let (cx, cy) = self.key(x, y);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) {
                    for &i in bucket {
                        f(i);
                    }
                }
            }
        }
    }
}
