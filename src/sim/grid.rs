//! Terrain grid and procedural layout
//!
//! The grid is a fixed `width x height` array of cells stored row-major.
//! Generation lays down, in order:
//! 1. Border walls on every perimeter cell
//! 2. The interior lattice: a wall on every even row and even column
//! 3. Blocks on free cells outside the spawn safe zone, each with
//!    independent probability `block_chance`

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::error::GridError;
use crate::clamp_chance;
use crate::consts::{BLOCK_CHANCE, SAFE_ZONE};

/// Terrain in one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    /// Indestructible, stops blasts
    Wall,
    /// Destructible, absorbs one blast ray and becomes empty
    Block,
}

impl Cell {
    /// Whether an entity may stand here
    #[inline]
    pub fn is_walkable(self) -> bool {
        self == Cell::Empty
    }

    fn glyph(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Wall => '#',
            Cell::Block => '+',
        }
    }

    fn from_glyph(c: char) -> Option<Self> {
        match c {
            '.' | ' ' => Some(Cell::Empty),
            '#' => Some(Cell::Wall),
            '+' => Some(Cell::Block),
            _ => None,
        }
    }
}

/// The arena terrain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// An all-empty grid
    pub fn new_empty(width: i32, height: i32) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            cells: vec![Cell::Empty; len],
        }
    }

    /// Border walls plus the fixed interior lattice, no blocks
    pub fn with_walls(width: i32, height: i32) -> Self {
        let mut grid = Self::new_empty(width, height);
        for y in 0..height {
            for x in 0..width {
                let pos = IVec2::new(x, y);
                if grid.is_perimeter(pos) || is_lattice(pos, width, height) {
                    grid.put(pos, Cell::Wall);
                }
            }
        }
        grid
    }

    /// Generate a fresh layout from `rng`
    ///
    /// Deterministic for a given generator state. Cells with
    /// `x <= safe_zone && y <= safe_zone` never receive a block.
    pub fn generate<R: Rng + ?Sized>(
        width: i32,
        height: i32,
        safe_zone: i32,
        block_chance: f64,
        rng: &mut R,
    ) -> Self {
        let mut grid = Self::with_walls(width, height);
        let mut blocks = 0usize;
        let chance = clamp_chance(block_chance);

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let pos = IVec2::new(x, y);
                if grid.cell(pos) != Cell::Empty || in_safe_zone(pos, safe_zone) {
                    continue;
                }
                if rng.random_bool(chance) {
                    grid.put(pos, Cell::Block);
                    blocks += 1;
                }
            }
        }

        log::info!("Generated {}x{} grid with {} blocks", width, height, blocks);
        grid
    }

    /// Seeded layout with the default safe zone and block chance
    pub fn from_seed(width: i32, height: i32, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        Self::generate(width, height, SAFE_ZONE, BLOCK_CHANCE, &mut rng)
    }

    /// Build a grid from text rows (`#` wall, `+` block, `.` empty)
    ///
    /// Rows must all be the same length. Unknown glyphs read as empty.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0) as i32;
        let mut grid = Self::new_empty(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate().take(width as usize) {
                let cell = Cell::from_glyph(c).unwrap_or_default();
                grid.put(IVec2::new(x as i32, y as i32), cell);
            }
        }
        grid
    }

    /// Render as text rows, inverse of [`Grid::from_rows`]
    pub fn to_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width.max(1) as usize)
            .map(|row| row.iter().map(|c| c.glyph()).collect())
            .collect()
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Terrain at `pos`, or `OutOfBounds`
    pub fn cell_at(&self, pos: IVec2) -> Result<Cell, GridError> {
        if !self.contains(pos) {
            return Err(GridError::out_of_bounds(pos));
        }
        Ok(self.cell(pos))
    }

    /// Terrain at `pos`, or `None` outside the grid
    pub fn get(&self, pos: IVec2) -> Option<Cell> {
        self.contains(pos).then(|| self.cell(pos))
    }

    /// Overwrite a cell
    pub fn set(&mut self, pos: IVec2, cell: Cell) -> Result<(), GridError> {
        if !self.contains(pos) {
            return Err(GridError::out_of_bounds(pos));
        }
        self.put(pos, cell);
        Ok(())
    }

    /// Turn a block into empty floor
    pub fn clear_block(&mut self, pos: IVec2) -> Result<(), GridError> {
        match self.cell_at(pos)? {
            Cell::Block => {
                self.put(pos, Cell::Empty);
                Ok(())
            }
            _ => Err(GridError::not_a_block(pos)),
        }
    }

    /// In bounds and empty
    #[inline]
    pub fn is_walkable(&self, pos: IVec2) -> bool {
        self.get(pos).is_some_and(Cell::is_walkable)
    }

    pub fn is_perimeter(&self, pos: IVec2) -> bool {
        pos.x == 0 || pos.y == 0 || pos.x == self.width - 1 || pos.y == self.height - 1
    }

    /// Number of cells holding `kind`
    pub fn count(&self, kind: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == kind).count()
    }

    /// All positions, row-major
    pub fn positions(&self) -> impl Iterator<Item = IVec2> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| IVec2::new(x, y)))
    }

    #[inline]
    fn index(&self, pos: IVec2) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    // Callers must have bounds-checked `pos`
    #[inline]
    fn cell(&self, pos: IVec2) -> Cell {
        self.cells[self.index(pos)]
    }

    #[inline]
    fn put(&mut self, pos: IVec2, cell: Cell) {
        let idx = self.index(pos);
        self.cells[idx] = cell;
    }
}

/// Interior wall lattice: even row and even column, inside the border
pub fn is_lattice(pos: IVec2, width: i32, height: i32) -> bool {
    pos.x >= 2
        && pos.y >= 2
        && pos.x < width - 1
        && pos.y < height - 1
        && pos.x % 2 == 0
        && pos.y % 2 == 0
}

/// Spawn corner that generation keeps free of blocks
#[inline]
pub fn in_safe_zone(pos: IVec2, safe_zone: i32) -> bool {
    pos.x <= safe_zone && pos.y <= safe_zone
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn generated(seed: u64) -> Grid {
        Grid::from_seed(17, 9, seed)
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(generated(42), generated(42));
        // Different seeds should (almost surely) differ
        assert_ne!(generated(1), generated(2));
    }

    #[test]
    fn test_wall_layout() {
        let grid = Grid::with_walls(17, 9);
        assert_eq!(grid.cell_at(IVec2::new(0, 0)), Ok(Cell::Wall));
        assert_eq!(grid.cell_at(IVec2::new(16, 8)), Ok(Cell::Wall));
        assert_eq!(grid.cell_at(IVec2::new(2, 2)), Ok(Cell::Wall));
        assert_eq!(grid.cell_at(IVec2::new(14, 6)), Ok(Cell::Wall));
        assert_eq!(grid.cell_at(IVec2::new(1, 1)), Ok(Cell::Empty));
        assert_eq!(grid.cell_at(IVec2::new(3, 2)), Ok(Cell::Empty));
        assert_eq!(grid.count(Cell::Block), 0);
        // 2*17 + 2*7 border cells, 7*3 lattice cells
        assert_eq!(grid.count(Cell::Wall), 48 + 21);
    }

    #[test]
    fn test_full_block_chance_fills_everything_outside_safe_zone() {
        let mut rng = Pcg32::seed_from_u64(7);
        let grid = Grid::generate(17, 9, 2, 1.0, &mut rng);
        for pos in grid.positions() {
            let cell = grid.cell_at(pos).unwrap();
            if grid.is_perimeter(pos) || is_lattice(pos, 17, 9) {
                assert_eq!(cell, Cell::Wall);
            } else if in_safe_zone(pos, 2) {
                assert_eq!(cell, Cell::Empty, "safe zone at {pos}");
            } else {
                assert_eq!(cell, Cell::Block, "expected block at {pos}");
            }
        }
    }

    #[test]
    fn test_out_of_range_block_chance_is_clamped() {
        let mut rng = Pcg32::seed_from_u64(7);
        let over = Grid::generate(17, 9, 2, 1.5, &mut rng);
        assert_eq!(over, Grid::generate(17, 9, 2, 1.0, &mut Pcg32::seed_from_u64(7)));

        let under = Grid::generate(17, 9, 2, -0.5, &mut rng);
        assert_eq!(under.count(Cell::Block), 0);
        let nan = Grid::generate(17, 9, 2, f64::NAN, &mut rng);
        assert_eq!(nan.count(Cell::Block), 0);
    }

    #[test]
    fn test_cell_at_out_of_bounds() {
        let grid = Grid::with_walls(17, 9);
        assert_eq!(
            grid.cell_at(IVec2::new(-1, 0)),
            Err(GridError::OutOfBounds { x: -1, y: 0 })
        );
        assert_eq!(
            grid.cell_at(IVec2::new(17, 3)),
            Err(GridError::OutOfBounds { x: 17, y: 3 })
        );
        assert_eq!(grid.get(IVec2::new(3, 9)), None);
    }

    #[test]
    fn test_clear_block() {
        let mut grid = Grid::from_rows(&["#####", "#.+.#", "#####"]);
        let block = IVec2::new(2, 1);
        assert_eq!(grid.clear_block(block), Ok(()));
        assert_eq!(grid.cell_at(block), Ok(Cell::Empty));
        // Already empty now
        assert_eq!(grid.clear_block(block), Err(GridError::NotABlock { x: 2, y: 1 }));
        assert_eq!(
            grid.clear_block(IVec2::ZERO),
            Err(GridError::NotABlock { x: 0, y: 0 })
        );
        assert_eq!(
            grid.clear_block(IVec2::new(9, 9)),
            Err(GridError::OutOfBounds { x: 9, y: 9 })
        );
    }

    #[test]
    fn test_rows_roundtrip() {
        let rows = ["#####", "#.+.#", "#.#.#", "#####"];
        let grid = Grid::from_rows(&rows);
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.to_rows(), rows);
    }

    #[test]
    fn test_set_cell() {
        let mut grid = Grid::with_walls(5, 5);
        assert_eq!(grid.set(IVec2::new(3, 1), Cell::Block), Ok(()));
        assert_eq!(grid.to_rows()[1], "#..+#");
        assert_eq!(
            grid.set(IVec2::new(5, 0), Cell::Wall),
            Err(GridError::OutOfBounds { x: 5, y: 0 })
        );
    }

    proptest! {
        #[test]
        fn prop_generation_invariants(seed in any::<u64>(), width in 5i32..24, height in 5i32..16) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let grid = Grid::generate(width, height, 2, 1.0 / 3.0, &mut rng);
            for pos in grid.positions() {
                let cell = grid.cell_at(pos).unwrap();
                if grid.is_perimeter(pos) || is_lattice(pos, width, height) {
                    prop_assert_eq!(cell, Cell::Wall);
                }
                if in_safe_zone(pos, 2) {
                    prop_assert_ne!(cell, Cell::Block);
                }
            }
            prop_assert_eq!(grid.cell_at(IVec2::new(1, 1)), Ok(Cell::Empty));
        }
    }
}
