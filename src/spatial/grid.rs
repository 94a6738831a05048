//! Uniform square grid over the world rectangle

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;

/// Integer cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The eight surrounding cells, orthogonals first
    pub fn neighbors(&self) -> [GridCell; 8] {
        let GridCell { x, y } = *self;
        [
            GridCell::new(x + 1, y),
            GridCell::new(x - 1, y),
            GridCell::new(x, y + 1),
            GridCell::new(x, y - 1),
            GridCell::new(x + 1, y + 1),
            GridCell::new(x + 1, y - 1),
            GridCell::new(x - 1, y + 1),
            GridCell::new(x - 1, y - 1),
        ]
    }

    pub fn manhattan(&self, other: &GridCell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Generic 2D grid with configurable cell size
#[derive(Debug, Clone)]
pub struct Grid<T: Clone + Default> {
    pub width: usize,
    pub height: usize,
    pub cell_size: f32,
    pub origin: Vec2,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize, cell_size: f32, origin: Vec2) -> Self {
        Self {
            width,
            height,
            cell_size,
            origin,
            data: vec![T::default(); width * height],
        }
    }

    /// Grid covering a `world_width` x `world_height` area from the origin
    pub fn covering(world_width: f32, world_height: f32, cell_size: f32) -> Self {
        let width = (world_width / cell_size).ceil().max(1.0) as usize;
        let height = (world_height / cell_size).ceil().max(1.0) as usize;
        Self::new(width, height, cell_size, Vec2::ZERO)
    }

    #[inline]
    pub fn in_bounds(&self, cell: GridCell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    #[inline]
    fn index(&self, cell: GridCell) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| cell.y as usize * self.width + cell.x as usize)
    }

    #[inline]
    pub fn get(&self, cell: GridCell) -> Option<&T> {
        self.index(cell).map(|i| &self.data[i])
    }

    #[inline]
    pub fn set(&mut self, cell: GridCell, value: T) {
        if let Some(i) = self.index(cell) {
            self.data[i] = value;
        }
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Convert world position to cell coordinates, clamped to the grid
    #[inline]
    pub fn world_to_cell(&self, pos: Vec2) -> GridCell {
        let x = ((pos.x - self.origin.x) / self.cell_size).floor() as i32;
        let y = ((pos.y - self.origin.y) / self.cell_size).floor() as i32;
        GridCell::new(
            x.clamp(0, self.width as i32 - 1),
            y.clamp(0, self.height as i32 - 1),
        )
    }

    /// Cell center in world coordinates
    pub fn cell_center(&self, cell: GridCell) -> Vec2 {
        Vec2::new(
            self.origin.x + (cell.x as f32 + 0.5) * self.cell_size,
            self.origin.y + (cell.y as f32 + 0.5) * self.cell_size,
        )
    }

    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| GridCell::new(x, y)))
    }
}
