//! Uniform grid for proximity queries.
//!
//! The arena is split into square cells; each cell holds the body samples
//! that fall inside it. The grid keeps its cell vectors between ticks and only
//! clears them, so a rebuild costs one pass over the inserted samples.

use glam::Vec2;

/// A body sample stored in the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridEntry {
    /// Registry slot of the owning snake at the time of the rebuild.
    pub owner: usize,
    /// Segment index within the owner's body.
    pub segment: usize,
    /// Segment position.
    pub position: Vec2,
}

/// Spatial hash grid over a square world.
pub struct SpatialGrid {
    cell_size: f32,
    /// Cells per row (and per column).
    cols: usize,
    cells: Vec<Vec<GridEntry>>,
    len: usize,
}

impl SpatialGrid {
    /// Create a grid covering `[0, world_size]` on both axes.
    pub fn new(world_size: f32, cell_size: f32) -> Self {
        let cols = ((world_size / cell_size).ceil() as usize).max(1);
        Self {
            cell_size,
            cols,
            cells: vec![Vec::new(); cols * cols],
            len: 0,
        }
    }

    /// Number of cells per row.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove every entry, keeping cell allocations.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.len = 0;
    }

    /// Column/row for a coordinate, clamped to the grid.
    #[inline]
    fn axis(&self, v: f32) -> usize {
        // `as usize` saturates negatives and NaN to 0.
        ((v / self.cell_size) as usize).min(self.cols - 1)
    }

    /// Cell index for a position. Positions outside the world land in the edge cells.
    #[inline]
    pub fn cell_index(&self, position: Vec2) -> usize {
        self.axis(position.y) * self.cols + self.axis(position.x)
    }

    /// Insert a body sample.
    #[inline]
    pub fn insert(&mut self, owner: usize, segment: usize, position: Vec2) {
        let idx = self.cell_index(position);
        self.cells[idx].push(GridEntry {
            owner,
            segment,
            position,
        });
        self.len += 1;
    }

    /// Indices of every cell whose box intersects the square around `center`
    /// with half-width `range`. Row-major order.
    pub fn nearby_cells(&self, center: Vec2, range: f32) -> impl Iterator<Item = usize> + use<> {
        let c1 = self.axis(center.x - range);
        let c2 = self.axis(center.x + range);
        let r1 = self.axis(center.y - range);
        let r2 = self.axis(center.y + range);
        let cols = self.cols;
        (r1..=r2).flat_map(move |r| (c1..=c2).map(move |c| r * cols + c))
    }

    /// Candidate entries near `center`. Callers do the exact distance test.
    pub fn candidates(&self, center: Vec2, range: f32) -> impl Iterator<Item = &GridEntry> + '_ {
        self.nearby_cells(center, range)
            .flat_map(move |idx| self.cells[idx].iter())
    }
}

impl std::fmt::Debug for SpatialGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialGrid")
            .field("cols", &self.cols)
            .field("cell_size", &self.cell_size)
            .field("entries", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let grid = SpatialGrid::new(6000.0, 200.0);
        assert_eq!(grid.cols(), 30);

        // Partial trailing cell still gets a column.
        let grid = SpatialGrid::new(1050.0, 200.0);
        assert_eq!(grid.cols(), 6);
    }

    #[test]
    fn test_cell_index_clamps() {
        let grid = SpatialGrid::new(1000.0, 100.0);
        assert_eq!(grid.cell_index(Vec2::new(0.0, 0.0)), 0);
        assert_eq!(grid.cell_index(Vec2::new(150.0, 250.0)), 2 * 10 + 1);
        assert_eq!(grid.cell_index(Vec2::new(-50.0, -50.0)), 0);
        assert_eq!(grid.cell_index(Vec2::new(5000.0, 5000.0)), 99);
        assert_eq!(grid.cell_index(Vec2::new(f32::NAN, 0.0)), 0);
    }

    #[test]
    fn test_nearby_cells_cover_range() {
        let grid = SpatialGrid::new(1000.0, 100.0);
        let cells: Vec<usize> = grid.nearby_cells(Vec2::new(150.0, 150.0), 60.0).collect();
        assert_eq!(cells, vec![0, 1, 2, 10, 11, 12, 20, 21, 22]);
    }

    #[test]
    fn test_nearby_cells_at_edge() {
        let grid = SpatialGrid::new(1000.0, 100.0);
        let cells: Vec<usize> = grid.nearby_cells(Vec2::new(5.0, 995.0), 30.0).collect();
        assert_eq!(cells, vec![90]);
        assert!(cells.iter().all(|&c| c < 100));
    }

    #[test]
    fn test_insert_and_query() {
        let mut grid = SpatialGrid::new(1000.0, 100.0);
        grid.insert(0, 8, Vec2::new(120.0, 120.0));
        grid.insert(1, 10, Vec2::new(180.0, 110.0));
        grid.insert(2, 12, Vec2::new(900.0, 900.0));
        assert_eq!(grid.len(), 3);

        let owners: Vec<usize> = grid
            .candidates(Vec2::new(150.0, 150.0), 40.0)
            .map(|e| e.owner)
            .collect();
        assert!(owners.contains(&0));
        assert!(owners.contains(&1));
        assert!(!owners.contains(&2));
    }

    #[test]
    fn test_clear() {
        let mut grid = SpatialGrid::new(1000.0, 100.0);
        grid.insert(0, 8, Vec2::new(10.0, 10.0));
        grid.clear();
        assert!(grid.is_empty());
        assert_eq!(grid.candidates(Vec2::new(10.0, 10.0), 50.0).count(), 0);
    }
}
