/// Tile grid over a luminance plane.
///
/// The requested grid is clamped to [MIN_GRID, MAX_GRID] tiles per side. Tile
/// size is `floor(extent / tiles)` (at least 1) and the last column and row
/// stretch to the plane edge to absorb the remainder. Tiles are enumerated in
/// row-major order and indexed by `row * tiles_x + col`.
///
/// An axis never carries more tiles than it has pixels, so no tile is empty
/// even for images smaller than the grid.

pub const MIN_GRID: usize = 2;
pub const MAX_GRID: usize = 64;

/// Clamp a requested grid size to the supported range.
pub fn clamp_grid_size(requested: i64) -> usize {
    requested.clamp(MIN_GRID as i64, MAX_GRID as i64) as usize
}

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl Tile {
    pub fn width(&self) -> usize {
        self.x1 - self.x0
    }

    pub fn height(&self) -> usize {
        self.y1 - self.y0
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.x0..self.x1).contains(&x) && (self.y0..self.y1).contains(&y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles_x: usize,
    tiles_y: usize,
    tile_w: usize,
    tile_h: usize,
}

impl TileGrid {
    /// Lay out a grid over a `width` x `height` plane. Both must be non-zero.
    pub fn new(width: usize, height: usize, grid_size: i64) -> Self {
        debug_assert!(width > 0 && height > 0);
        let grid = clamp_grid_size(grid_size);
        let tiles_x = grid.min(width);
        let tiles_y = grid.min(height);

        Self {
            width,
            height,
            tiles_x,
            tiles_y,
            tile_w: (width / tiles_x).max(1),
            tile_h: (height / tiles_y).max(1),
        }
    }

    pub fn tiles_x(&self) -> usize {
        self.tiles_x
    }

    pub fn tiles_y(&self) -> usize {
        self.tiles_y
    }

    /// Nominal tile width; the last column may be wider.
    pub fn tile_width(&self) -> usize {
        self.tile_w
    }

    /// Nominal tile height; the last row may be taller.
    pub fn tile_height(&self) -> usize {
        self.tile_h
    }

    pub fn len(&self) -> usize {
        self.tiles_x * self.tiles_y
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tile(&self, col: usize, row: usize) -> Tile {
        debug_assert!(col < self.tiles_x && row < self.tiles_y);
        let x0 = col * self.tile_w;
        let y0 = row * self.tile_h;
        let x1 = if col == self.tiles_x - 1 {
            self.width
        } else {
            x0 + self.tile_w
        };
        let y1 = if row == self.tiles_y - 1 {
            self.height
        } else {
            y0 + self.tile_h
        };
        Tile { x0, y0, x1, y1 }
    }

    /// All tiles, row by row, left to right.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        (0..self.tiles_y).flat_map(move |row| (0..self.tiles_x).map(move |col| self.tile(col, row)))
    }

    /// Column of the tile containing pixel column `x`.
    #[inline]
    pub fn col_at(&self, x: usize) -> usize {
        (x / self.tile_w).min(self.tiles_x - 1)
    }

    /// Row of the tile containing pixel row `y`.
    #[inline]
    pub fn row_at(&self, y: usize) -> usize {
        (y / self.tile_h).min(self.tiles_y - 1)
    }

    /// Row-major index of the tile containing pixel `(x, y)`.
    #[inline]
    pub fn index_at(&self, x: usize, y: usize) -> usize {
        self.row_at(y) * self.tiles_x + self.col_at(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coverage(grid: &TileGrid, width: usize, height: usize) -> Vec<u32> {
        let mut hits = vec![0u32; width * height];
        for tile in grid.tiles() {
            assert!(tile.area() > 0, "empty tile {tile:?}");
            for y in tile.y0..tile.y1 {
                for x in tile.x0..tile.x1 {
                    hits[y * width + x] += 1;
                }
            }
        }
        hits
    }

    #[test]
    fn test_clamp_grid_size() {
        assert_eq!(clamp_grid_size(i64::MIN), 2);
        assert_eq!(clamp_grid_size(0), 2);
        assert_eq!(clamp_grid_size(1), 2);
        assert_eq!(clamp_grid_size(8), 8);
        assert_eq!(clamp_grid_size(64), 64);
        assert_eq!(clamp_grid_size(1000), 64);
    }

    #[test]
    fn test_remainder_goes_to_last_tile() {
        let grid = TileGrid::new(10, 7, 3);
        assert_eq!(grid.tile_width(), 3);
        assert_eq!(grid.tile_height(), 2);
        assert_eq!(grid.tile(0, 0), Tile { x0: 0, y0: 0, x1: 3, y1: 2 });
        assert_eq!(grid.tile(2, 0), Tile { x0: 6, y0: 0, x1: 10, y1: 2 });
        assert_eq!(grid.tile(2, 2), Tile { x0: 6, y0: 4, x1: 10, y1: 7 });
    }

    #[test]
    fn test_row_major_order() {
        let grid = TileGrid::new(8, 8, 2);
        let origins: Vec<_> = grid.tiles().map(|t| (t.x0, t.y0)).collect();
        assert_eq!(origins, vec![(0, 0), (4, 0), (0, 4), (4, 4)]);
    }

    #[test]
    fn test_tiles_partition_plane() {
        for &(width, height) in &[(1, 1), (1, 9), (5, 3), (16, 16), (17, 33), (100, 7), (130, 129)] {
            for grid_size in [1, 2, 3, 7, 8, 31, 64, 500] {
                let grid = TileGrid::new(width, height, grid_size);
                let hits = coverage(&grid, width, height);
                assert!(
                    hits.iter().all(|&h| h == 1),
                    "{width}x{height} grid {grid_size} does not partition the plane"
                );
            }
        }
    }

    #[test]
    fn test_index_at_matches_containing_tile() {
        let grid = TileGrid::new(23, 11, 4);
        let tiles: Vec<_> = grid.tiles().collect();
        for y in 0..11 {
            for x in 0..23 {
                assert!(tiles[grid.index_at(x, y)].contains(x, y), "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_small_plane_limits_tile_count() {
        let grid = TileGrid::new(3, 100, 8);
        assert_eq!(grid.tiles_x(), 3);
        assert_eq!(grid.tiles_y(), 8);
        assert_eq!(grid.tile_width(), 1);
        assert_eq!(grid.len(), 24);

        let grid = TileGrid::new(1, 1, 2);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.tile(0, 0).area(), 1);
    }
}
