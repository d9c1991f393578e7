//! Uniform toroidal grid partition for bounded neighbor queries.
//!
//! Cell size equals the interaction cutoff (`distance_unit`), so any
//! particle's interaction neighborhood is contained in a small constant
//! block of cells and the per-tick neighbor work stays expected O(n).

/// Grid cell coordinate, `(col, row)`.
pub type Cell = (usize, usize);

pub struct SpatialGrid {
    cols: usize,
    rows: usize,
    cell_size: f64,
    /// Flattened `rows * cols` cells of particle slot indices, `row * cols + col`.
    cells: Vec<Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(width: f64, height: f64, cell_size: f64) -> Self {
        let mut grid = Self {
            cols: 0,
            rows: 0,
            cell_size,
            cells: Vec::new(),
        };
        grid.rebuild(width, height, cell_size);
        grid
    }

    /// Recomputes the cell layout and discards all contents. Every live
    /// particle must be re-inserted by the caller afterward.
    pub fn rebuild(&mut self, width: f64, height: f64, cell_size: f64) {
        self.cell_size = cell_size;
        self.cols = ((width / cell_size).ceil() as usize).max(1);
        self.rows = ((height / cell_size).ceil() as usize).max(1);
        self.cells.clear();
        self.cells.resize_with(self.cols * self.rows, Vec::new);
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Cell owning `position`, with negative and overflowing coordinates
    /// wrapped modularly onto the torus.
    pub fn cell_for(&self, x: f64, y: f64) -> Cell {
        let col = (x / self.cell_size).floor() as i64;
        let row = (y / self.cell_size).floor() as i64;
        (
            col.rem_euclid(self.cols as i64) as usize,
            row.rem_euclid(self.rows as i64) as usize,
        )
    }

    /// Registers `slot` under the cell matching its position and returns
    /// that cell for the particle to cache.
    pub fn insert(&mut self, slot: usize, x: f64, y: f64) -> Cell {
        let cell = self.cell_for(x, y);
        self.cells[cell.1 * self.cols + cell.0].push(slot);
        cell
    }

    /// Removes `slot` from its cached cell. A `None` cell means the
    /// particle was never inserted and there is nothing to do.
    pub fn remove(&mut self, slot: usize, cell: Option<Cell>) {
        let Some((col, row)) = cell else { return };
        let Some(bucket) = self.cells.get_mut(row * self.cols + col) else {
            return;
        };
        if let Some(pos) = bucket.iter().position(|&s| s == slot) {
            bucket.swap_remove(pos);
        }
    }

    /// True when `slot` is actually registered in the bucket for `cell`,
    /// not merely cached as living there.
    pub fn contains(&self, slot: usize, cell: Cell) -> bool {
        self.cells
            .get(cell.1 * self.cols + cell.0)
            .is_some_and(|bucket| bucket.contains(&slot))
    }

    /// Remove-then-insert, called once per moved particle per tick.
    pub fn relocate(&mut self, slot: usize, cell: Option<Cell>, x: f64, y: f64) -> Cell {
        self.remove(slot, cell);
        self.insert(slot, x, y)
    }

    /// Collects every slot (excluding `slot` itself) in the 3x3 cell block
    /// around `cell`, widened to 5x5 when the cell lies within 2 cells of
    /// any edge so wrap-around adjacency is fully covered. Lookups wrap
    /// modularly; `out` is a reused buffer and is cleared first.
    pub fn neighbors(&self, slot: usize, cell: Cell, out: &mut Vec<usize>) {
        out.clear();
        let (col, row) = cell;

        let near_edge = col < 2
            || col + 2 >= self.cols
            || row < 2
            || row + 2 >= self.rows;

        for dy in -2i64..=2 {
            for dx in -2i64..=2 {
                if !near_edge && (dx.abs() > 1 || dy.abs() > 1) {
                    continue;
                }
                let c = (col as i64 + dx).rem_euclid(self.cols as i64) as usize;
                let r = (row as i64 + dy).rem_euclid(self.rows as i64) as usize;
                let Some(bucket) = self.cells.get(r * self.cols + c) else {
                    continue;
                };
                for &other in bucket {
                    if other != slot {
                        out.push(other);
                    }
                }
            }
        }
    }

    #[cfg(test)]
    fn cell_contents(&self, cell: Cell) -> &[usize] {
        &self.cells[cell.1 * self.cols + cell.0]
    }
}
