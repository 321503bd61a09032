use crate::Coords;

use rand::Rng;

pub const DEFAULT_GRID_WIDTH: i16 = 32;
pub const DEFAULT_GRID_HEIGHT: i16 = 24;

/// Fixed-size playfield. Cells are addressed `(x, y)` with the origin in the
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    width: i16,
    height: i16,
}

impl Grid {
    pub fn new(width: i16, height: i16) -> Self {
        Grid { width: width.max(1), height: height.max(1) }
    }

    pub fn width(&self) -> i16 {
        self.width
    }

    pub fn height(&self) -> i16 {
        self.height
    }

    pub fn contains(&self, pos: Coords) -> bool {
        pos.0 >= 0 && pos.0 < self.width && pos.1 >= 0 && pos.1 < self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major iteration over every cell.
    pub fn cells(&self) -> impl Iterator<Item = Coords> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| (x, y)))
    }

    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Coords {
        (rng.gen_range(0..self.width), rng.gen_range(0..self.height))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT)
    }
}

pub fn manhattan(a: Coords, b: Coords) -> i16 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}
